// Parcel specification: dimensions from a named template or typed in,
// then weight. Values are taken as entered; only units are constrained.

use crate::config::TemplateRegistry;
use crate::models::{DistanceUnit, MassUnit, Parcel, ParcelTemplate};
use crate::prompt::{Prompter, TextQuestion};
use anyhow::{Context, Result};

/// Menu label for a registry entry.
pub fn template_label(name: &str, template: &ParcelTemplate) -> String {
    format!(
        "[{}] Unit={} L={} W={} H={}",
        name, template.u, template.l, template.w, template.h
    )
}

/// Dimensions before the weight is known.
enum Shape {
    Template(String, ParcelTemplate),
    Custom {
        length: String,
        width: String,
        height: String,
        unit: DistanceUnit,
    },
}

pub fn specify_parcel(prompter: &dyn Prompter, templates: &TemplateRegistry) -> Result<Parcel> {
    println!("Parcel information");

    let shape = if !templates.is_empty() && prompter.confirm("Use a parcel template?", true)? {
        let entries: Vec<(&String, &ParcelTemplate)> = templates.iter().collect();
        let labels: Vec<String> = entries
            .iter()
            .map(|(name, tpl)| template_label(name, tpl))
            .collect();
        let index = prompter.select("What parcel template should we use?", &labels, 0)?;
        let (name, tpl) = entries
            .get(index)
            .copied()
            .context("Selected parcel template does not exist")?;
        Shape::Template(name.clone(), tpl.clone())
    } else {
        ask_dimensions(prompter)?
    };

    let weight = prompter.text(&TextQuestion::new("Parcel weight?"))?;
    let mass_unit = choose(prompter, "Parcel mass units?", &MassUnit::CHOICES, MassUnit::as_str)?;

    Ok(match shape {
        Shape::Template(name, tpl) => Parcel::from_template(&name, &tpl, weight, mass_unit),
        Shape::Custom {
            length,
            width,
            height,
            unit,
        } => Parcel {
            object_id: None,
            length,
            width,
            height,
            distance_unit: unit,
            weight,
            mass_unit,
            template: None,
            carrier_template: None,
        },
    })
}

fn ask_dimensions(prompter: &dyn Prompter) -> Result<Shape> {
    let length = prompter.text(&TextQuestion::new("Length?"))?;
    let width = prompter.text(&TextQuestion::new("Width?"))?;
    let height = prompter.text(&TextQuestion::new("Height?"))?;
    let unit = choose(
        prompter,
        "Parcel distance units?",
        &DistanceUnit::CHOICES,
        DistanceUnit::as_str,
    )?;
    Ok(Shape::Custom {
        length,
        width,
        height,
        unit,
    })
}

/// Single choice over an enumerated set of values.
pub(crate) fn choose<T: Copy>(
    prompter: &dyn Prompter,
    prompt: &str,
    values: &[T],
    label: fn(T) -> &'static str,
) -> Result<T> {
    let items: Vec<String> = values.iter().map(|v| label(*v).to_string()).collect();
    let index = prompter.select(prompt, &items, 0)?;
    values
        .get(index)
        .copied()
        .with_context(|| format!("No choice #{} for '{}'", index, prompt))
}
