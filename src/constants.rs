/// Column name constants to keep the schema consistent across the codebase
pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const ADDRESS: &str = "address";
pub const POSTAL_CODE: &str = "cp";
pub const CITY: &str = "city";
pub const PROVINCE: &str = "province";
pub const COUNTRY_NAME: &str = "country_name";
pub const PHONE_NUMBER: &str = "phone_number";
pub const MODE: &str = "mode";
pub const HIRING: &str = "hiring";
pub const STATUS: &str = "status";
pub const AMOUNT: &str = "amount";
pub const YEAR: &str = "year";
pub const INCORPORATED: &str = "incorporated";
pub const EMAIL: &str = "email";
pub const LONGITUDE: &str = "longitude";
pub const LATITUDE: &str = "latitude";

/// Separator used when a merged column carries more than one value
pub const MERGE_DELIMITER: &str = "//";

/// Fixed column ordering shared by the intermediate and final outputs
pub const OUTPUT_COLUMNS: [&str; 47] = [
    "id",
    "country",
    "code",
    "name",
    "address.1",
    "address",
    "cp",
    "city",
    "province",
    "country_name",
    "activity_code",
    "activity",
    "NAICS_activity",
    "NAICS_activity_code",
    "NAICS_activity_secondary",
    "NAICS_activity_secondary_code",
    "activity_code_secondary",
    "Secondary_Activity_Description",
    "activity_code_other",
    "web_description",
    "legal_form",
    "employees_total",
    "number_of_directors",
    "year",
    "amount",
    "currency",
    "mode",
    "company_number",
    "incorporated",
    "status",
    "longitude",
    "latitude",
    "phone_number",
    "email",
    "website",
    "branches_addresses",
    "online_shop",
    "number_of_reviews",
    "average_rating",
    "social_link_facebook",
    "social_link_twitter",
    "social_link_linkedin",
    "social_link_youtube",
    "social_link_instagram",
    "hiring",
    "hours",
    "confidence_score",
];

/// Integer-valued count columns
pub const COUNT_COLUMNS: [&str; 4] = [
    "number_of_directors",
    "employees_total",
    "online_shop",
    "number_of_reviews",
];

/// Activity code columns and the zero-padded width each one is rendered with
pub const ACTIVITY_CODE_WIDTHS: [(&str, usize); 4] = [
    ("activity_code", 4),
    ("activity_code_secondary", 4),
    ("NAICS_activity_code", 6),
    ("NAICS_activity_secondary_code", 6),
];

/// Default fill values for absent cells
pub fn default_fill_values() -> Vec<(&'static str, &'static str)> {
    vec![
        ("number_of_directors", "0"),
        ("employees_total", "0"),
        ("online_shop", "0"),
        ("number_of_reviews", "0"),
        ("average_rating", "0"),
        ("amount", "0"),
        ("currency", "EUR"),
        ("status", "Inactive"),
        ("mode", "Estimated"),
        ("phone_number", "-"),
        ("email", "-"),
        ("year", "-"),
        ("incorporated", "-"),
        ("hours", "-"),
        ("hiring", "0"),
        ("NAICS_activity_secondary", "-"),
        ("Secondary_Activity_Description", "-"),
        ("web_description", "-"),
        ("website", "-"),
        ("social_link_facebook", "-"),
        ("social_link_twitter", "-"),
        ("social_link_linkedin", "-"),
        ("social_link_youtube", "-"),
        ("social_link_instagram", "-"),
        ("branches_addresses", "-"),
        ("activity_code", "0000"),
        ("activity_code_secondary", "0000"),
        ("activity_code_other", "0000"),
        ("NAICS_activity_code", "000000"),
        ("NAICS_activity_secondary_code", "000000"),
    ]
}
