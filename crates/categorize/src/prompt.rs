use ledgerscan_core::Category;

const GUIDELINES: &str = "\
Guidelines:
- 'dining': cafes, restaurants, food stalls, juice shops, salad bars, drink stalls.
- 'shopping': retail shops, supermarkets, groceries, fashion, electronics, malls.
- 'transport': taxis, ride-hailing (e.g. grab), buses, trains, fuel, parking, tolls.
- 'travel': hotels, airlines, travel agencies, tours, overseas stays.
- 'insurance': insurance companies, premiums, protection plans.
- 'utilities': electricity, water, gas, mobile, internet, telco bills.
- 'ignore': bank fees, interest, charges, ATM withdrawals, bank transfers.
- 'misc': ONLY if it is clearly a person's name or there is no reasonable business guess.
";

/// Few-shot examples: merchant, optional hint, expected label.
const EXAMPLES: &[(&str, Option<&str>, Category)] = &[
    ("JUICYFRESH", None, Category::Dining),
    ("WHOLLY GREENS", None, Category::Shopping),
    ("DRINKS STAL", None, Category::Dining),
    ("COCA", None, Category::Dining),
    ("GRAB", None, Category::Transport),
    ("M1 MAXX", None, Category::Utilities),
    ("ST LOGISTICS", None, Category::Shopping),
    ("NUR HAZAH", Some("looks like a person"), Category::Misc),
];

/// Build the classification prompt for one merchant.
pub fn build_prompt(company_person: &str, description: Option<&str>) -> String {
    let labels = Category::ALL.map(Category::as_str).join(", ");

    let mut prompt = format!(
        "You are classifying bank statement transactions into exactly one category: {labels}.\n\n"
    );
    prompt.push_str(GUIDELINES);
    prompt.push_str(&format!(
        "\nImportant:\n\
         - The ONLY valid category words you may output are: {labels}.\n\
         - If you think 'groceries' is correct, you MUST output 'shopping'.\n\
         - If the name looks like a shop, restaurant, drink stall, grocery or brand, \
         choose the closest business category (usually 'dining' or 'shopping').\n\n\
         Examples:\n"
    ));
    for (merchant, hint, category) in EXAMPLES {
        let hint = hint.map(|h| format!(" ({h})")).unwrap_or_default();
        prompt.push_str(&format!("- Merchant: '{merchant}'{hint} -> Category: {category}\n"));
    }
    prompt.push_str(
        "\nNow classify the merchant below. First think briefly about the best category, \
         then on the last line output ONLY the category name in lowercase. \
         Do not write the word 'misc' anywhere unless you choose it as the final category.\n\n",
    );

    prompt.push_str(&format!("Company/person: \"{company_person}\""));
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        prompt.push_str(&format!("\nAdditional details: \"{description}\""));
    }
    prompt
}
