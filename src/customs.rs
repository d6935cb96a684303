// Customs declaration for shipments that cross a border. One item per
// declaration; field validators are the only checks.

use crate::models::{
    Address, ContentsType, CustomsDeclaration, CustomsDeclarationDraft, CustomsItem, MassUnit,
    NonDeliveryOption,
};
use crate::parcel::choose;
use crate::prompt::{Prompter, TextQuestion};
use crate::session::Session;
use crate::ui::with_spinner;
use crate::validate;
use anyhow::Result;
use log::info;

/// Whether the two ends of a shipment are in different countries.
pub fn crosses_border(sender: &Address, recipient: &Address) -> bool {
    !sender.country.eq_ignore_ascii_case(&recipient.country)
}

/// Offer and collect a customs declaration.
///
/// Nothing is asked for domestic shipments. Returns `Ok(None)` when no
/// declaration is needed or the operator declines to add one.
pub fn declare_customs(
    session: &Session<'_>,
    sender: &Address,
    recipient: &Address,
) -> Result<Option<CustomsDeclaration>> {
    if !crosses_border(sender, recipient) {
        return Ok(None);
    }
    if !session.prompter.confirm(
        &format!(
            "This parcel goes from {} to {}. Add a customs declaration?",
            sender.country, recipient.country
        ),
        true,
    )? {
        return Ok(None);
    }

    println!("Customs information");
    let item = collect_item(session.prompter, sender)?;
    let draft = collect_declaration(session.prompter, sender, item)?;
    let declaration = with_spinner("Creating customs declaration...", || {
        session.service.create_customs_declaration(&draft)
    })?;
    info!("customs declaration stored as {:?}", declaration.object_id);
    Ok(Some(declaration))
}

fn collect_item(prompter: &dyn Prompter, sender: &Address) -> Result<CustomsItem> {
    let description = prompter.text(&TextQuestion::new("Item description"))?;
    let quantity = prompter.text(&TextQuestion::new("Quantity").validate(validate::whole_number))?;
    let net_weight = prompter.text(
        &TextQuestion::new("Net weight").validate(validate::non_negative_decimal),
    )?;
    let mass_unit = choose(prompter, "Net weight units?", &MassUnit::CHOICES, MassUnit::as_str)?;
    let value_amount = prompter.text(
        &TextQuestion::new("Value").validate(validate::non_negative_decimal),
    )?;
    let value_currency = prompter.text(
        &TextQuestion::new("Currency code")
            .default_to("USD")
            .validate(validate::currency_code),
    )?;
    let origin_country = prompter.text(
        &TextQuestion::new("Origin country")
            .default_to(&sender.country)
            .validate(validate::country_code),
    )?;
    let tariff_number = prompter.text(&TextQuestion::new("Tariff number").optional())?;
    let sku_code = prompter.text(&TextQuestion::new("SKU").optional())?;

    Ok(CustomsItem {
        object_id: None,
        description,
        quantity: validate::parse_whole_number(&quantity).map_err(anyhow::Error::msg)?,
        net_weight,
        mass_unit,
        value_amount,
        value_currency: value_currency.to_uppercase(),
        origin_country: origin_country.to_uppercase(),
        tariff_number: Some(tariff_number).filter(|t| !t.is_empty()),
        sku_code: Some(sku_code).filter(|s| !s.is_empty()),
    })
}

fn collect_declaration(
    prompter: &dyn Prompter,
    sender: &Address,
    item: CustomsItem,
) -> Result<CustomsDeclarationDraft> {
    let contents_type = choose(
        prompter,
        "What is in the parcel?",
        &ContentsType::ALL,
        ContentsType::as_str,
    )?;
    let contents_explanation =
        prompter.text(&TextQuestion::new("Explain the contents").optional())?;
    let non_delivery_option = choose(
        prompter,
        "What should happen if the parcel cannot be delivered?",
        &NonDeliveryOption::ALL,
        NonDeliveryOption::as_str,
    )?;
    let certify = prompter.confirm("Do you certify that this customs information is correct?", true)?;
    let certify_signer =
        prompter.text(&TextQuestion::new("Certified by").default_to(&sender.name))?;

    Ok(CustomsDeclarationDraft {
        contents_type,
        contents_explanation,
        non_delivery_option,
        certify,
        certify_signer,
        items: vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplateRegistry;
    use crate::testing::{address, Answer, ScriptedPrompter, StubService};

    fn session<'a>(
        prompter: &'a ScriptedPrompter,
        service: &'a StubService,
        templates: &'a TemplateRegistry,
    ) -> Session<'a> {
        Session {
            prompter,
            service,
            templates,
            sender: address("Mr Hippo", "215 Clayton St.", "US"),
        }
    }

    fn item_answers() -> Vec<Answer> {
        vec![
            Answer::Text("T-Shirt"),
            Answer::Text("20"),
            Answer::Text("1"),
            Answer::Pick("lb"),
            Answer::Text("200"),
            Answer::Default,
            Answer::Default,
            Answer::Default,
            Answer::Text("TS-1"),
        ]
    }

    #[test]
    fn domestic_shipments_skip_customs_without_asking() {
        let prompter = ScriptedPrompter::new(vec![]);
        let service = StubService::default();
        let templates = TemplateRegistry::default();
        let s = session(&prompter, &service, &templates);
        let sender = address("Mr Hippo", "215 Clayton St.", "US");
        let recipient = address("Ms Hippo", "965 Mission St", "us");

        assert_eq!(declare_customs(&s, &sender, &recipient).unwrap(), None);
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn declining_leaves_no_declaration() {
        let prompter = ScriptedPrompter::new(vec![Answer::No]);
        let service = StubService::default();
        let templates = TemplateRegistry::default();
        let s = session(&prompter, &service, &templates);
        let sender = address("Mr Hippo", "215 Clayton St.", "US");
        let recipient = address("Herr Nilpferd", "Unter den Linden 1", "DE");

        assert_eq!(declare_customs(&s, &sender, &recipient).unwrap(), None);
        assert!(service.declarations.borrow().is_empty());
    }

    #[test]
    fn international_declaration_is_submitted_with_one_item() {
        let mut answers = vec![Answer::Yes];
        answers.extend(item_answers());
        answers.extend([
            Answer::Pick("MERCHANDISE"),
            Answer::Text("T-Shirt purchase"),
            Answer::Pick("RETURN"),
            Answer::Yes,
            Answer::Default,
        ]);
        let prompter = ScriptedPrompter::new(answers);
        let service = StubService::default();
        let templates = TemplateRegistry::default();
        let s = session(&prompter, &service, &templates);
        let sender = address("Mr Hippo", "215 Clayton St.", "US");
        let recipient = address("Herr Nilpferd", "Unter den Linden 1", "DE");

        let declaration = declare_customs(&s, &sender, &recipient).unwrap().unwrap();
        assert_eq!(declaration.object_id.as_deref(), Some("cust_1"));

        let drafts = service.declarations.borrow();
        let draft = &drafts[0];
        assert_eq!(draft.contents_type, ContentsType::Merchandise);
        assert_eq!(draft.non_delivery_option, NonDeliveryOption::Return);
        assert_eq!(draft.certify_signer, "Mr Hippo");
        assert_eq!(draft.items.len(), 1);
        let item = &draft.items[0];
        assert_eq!(item.quantity, 20);
        assert_eq!(item.value_currency, "USD");
        assert_eq!(item.origin_country, "US");
        assert_eq!(item.tariff_number, None);
        assert_eq!(item.sku_code.as_deref(), Some("TS-1"));
    }

    #[test]
    fn contents_and_policy_menus_are_enumerated() {
        let mut answers = vec![Answer::Yes];
        answers.extend(item_answers());
        answers.extend([
            Answer::Pick("GIFT"),
            Answer::Default,
            Answer::Pick("ABANDON"),
            Answer::Yes,
            Answer::Text("Ms Signer"),
        ]);
        let prompter = ScriptedPrompter::new(answers);
        let service = StubService::default();
        let templates = TemplateRegistry::default();
        let s = session(&prompter, &service, &templates);
        let sender = address("Mr Hippo", "215 Clayton St.", "US");
        let recipient = address("Ms Castor", "1 Rue de Rivoli", "FR");

        declare_customs(&s, &sender, &recipient).unwrap();
        let contents = &prompter.asked_for("What is in the parcel?")[0].items;
        assert_eq!(contents.len(), 7);
        assert_eq!(contents[4], "HUMANITARIAN_DONATION");
        let policy = &prompter.asked_for("What should happen if the parcel cannot be delivered?")[0];
        assert_eq!(policy.items, vec!["ABANDON", "RETURN"]);
        assert_eq!(service.declarations.borrow()[0].certify_signer, "Ms Signer");
    }

    #[test]
    fn bad_quantity_is_rejected_by_the_validator() {
        let mut answers = vec![Answer::Yes, Answer::Text("T-Shirt"), Answer::Text("2.5")];
        answers.extend(item_answers());
        let prompter = ScriptedPrompter::new(answers);
        let service = StubService::default();
        let templates = TemplateRegistry::default();
        let s = session(&prompter, &service, &templates);
        let sender = address("Mr Hippo", "215 Clayton St.", "US");
        let recipient = address("Herr Nilpferd", "Unter den Linden 1", "DE");

        let err = declare_customs(&s, &sender, &recipient).unwrap_err();
        assert!(err.to_string().contains("whole number"), "{}", err);
    }
}
