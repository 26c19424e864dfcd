//! Static interface labels in both languages.
//!
//! [`t`] looks a key up for a language, falling back to the English label and
//! then to the key itself, so a missing translation never renders blank.

use crate::lang::Lang;

/// `(key, english, georgian)`.
const LABELS: &[(&str, &str, &str)] = &[
    ("browse_archive", "Browse the Archive", "დაათვალიერეთ არქივი"),
    (
        "search_placeholder",
        "Search photos by title or description…",
        "ძებნეთ ფოტოები სათაურით ან აღწერით…",
    ),
    ("search", "Search", "ძებნა"),
    (
        "browse_by",
        "Browse by theme, photographer, place and collection.",
        "დაათვალიერეთ თემით, ფოტოგრაფით, ადგილით და კოლექციით.",
    ),
    ("themes", "Themes", "თემები"),
    ("photographers", "Photographers", "ფოტოგრაფები"),
    ("places", "Places", "ადგილები"),
    ("collections", "Collections", "კოლექციები"),
    ("collection", "Collection", "კოლექცია"),
    ("sub_collections", "Sub-collections", "ქვეკოლექციები"),
    ("recently_added", "Recently added", "ახლახან დამატებული"),
    ("photos", "Photos", "ფოტოები"),
    ("all_themes", "All themes", "ყველა თემა"),
    ("all_photographers", "All photographers", "ყველა ფოტოგრაფი"),
    ("all_places", "All places", "ყველა ადგილი"),
    ("all_collections", "All collections", "ყველა კოლექცია"),
    (
        "no_photos_theme",
        "No photos found for this theme.",
        "ამ თემისთვის ფოტოები არ მოიძებნა.",
    ),
    (
        "no_photos_photographer",
        "No photos found for this photographer.",
        "ამ ფოტოგრაფისთვის ფოტოები არ მოიძებნა.",
    ),
    (
        "no_photos_place",
        "No photos found for this place.",
        "ამ ადგილისთვის ფოტოები არ მოიძებნა.",
    ),
    (
        "no_photos_collection",
        "No photos in this collection.",
        "ამ კოლექციაში ფოტოები არ არის.",
    ),
    ("no_results", "No results.", "შედეგები არ მოიძებნა."),
    (
        "not_available_lang",
        "This content is not available in this language.",
        "ეს კონტენტი არ არის ხელმისაწვდომი ამ ენაზე.",
    ),
    ("not_found", "Not found.", "ვერ მოიძებნა."),
    (
        "unavailable",
        "The archive is temporarily unavailable. Please try again later.",
        "არქივი დროებით მიუწვდომელია. გთხოვთ, სცადოთ მოგვიანებით.",
    ),
    (
        "not_configured",
        "The archive connection is not configured.",
        "არქივთან კავშირი არ არის კონფიგურირებული.",
    ),
    ("prev", "← Prev", "← წინა"),
    ("next", "Next →", "შემდეგი →"),
    ("date", "Date", "თარიღი"),
    ("photographer", "Photographer", "ფოტოგრაფი"),
    ("rights", "Rights", "უფლებები"),
    ("attribution", "Attribution", "მიწერა"),
    ("source", "Source", "წყარო"),
    ("type", "Type", "ტიპი"),
    ("owner_collector", "Owner / Collector", "მფლობელი / შემგროვებელი"),
    ("date_range", "Date range", "თარიღები"),
    ("curated_by", "Curated by", "კურატორი"),
    ("home", "Home", "მთავარი"),
    ("certainty", "Certainty", "სიზუსტე"),
    ("parent", "Parent", "მშობელი"),
    ("alt_names", "Alt names", "ალტერნატიული სახელები"),
];

/// Label for `key` in `lang`.
pub fn t(key: &str, lang: Lang) -> &str {
    match LABELS.iter().find(|(k, _, _)| *k == key) {
        Some(&(_, en, ka)) => match lang {
            Lang::Ka if !ka.is_empty() => ka,
            _ => en,
        },
        None => key,
    }
}

/// Human label for a photo's rights status. `None` for statuses this table
/// does not know; callers show the raw value.
pub fn rights_label(status: &str, lang: Lang) -> Option<&'static str> {
    let (en, ka) = match status {
        "public_domain" => ("Public domain - Free to use", "საჯარო დომენი - უფასო გამოყენება"),
        "museum_collection" => (
            "Museum collection - Licensing available",
            "მუზეუმის კოლექცია - ლიცენზირება ხელმისაწვდომია",
        ),
        "archive_holding" => (
            "Archive holding - Contact museum for licensing",
            "არქივის შენახვა - დაუკავშირდით მუზეუმს ლიცენზირებისთვის",
        ),
        "restricted" => ("Restricted - Permission required", "შეზღუდული - საჭიროა ნებართვა"),
        "unknown" => (
            "Rights status unknown - Contact museum",
            "უფლებების სტატუსი უცნობია - დაუკავშირდით მუზეუმს",
        ),
        _ => return None,
    };
    Some(match lang {
        Lang::En => en,
        Lang::Ka => ka,
    })
}

/// English label for a collection type value.
pub fn collection_type_label(value: &str) -> Option<&'static str> {
    Some(match value {
        "family_donation" => "Family Donation",
        "institutional_acquisition" => "Institutional Acquisition",
        "photographer_estate" => "Photographer Estate",
        "organizational_archive" => "Organizational Archive",
        "curatorial_project" => "Curatorial Project",
        "technical_grouping" => "Technical Grouping",
        "parent_container" => "Parent Container",
        _ => return None,
    })
}

/// "1 sub-collection", "3 sub-collections".
pub fn sub_collection_count(count: u32, lang: Lang) -> String {
    match lang {
        Lang::Ka => format!("{count} ქვეკოლექცია"),
        Lang::En if count == 1 => "1 sub-collection".to_string(),
        Lang::En => format!("{count} sub-collections"),
    }
}
