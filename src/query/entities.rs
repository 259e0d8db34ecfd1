//! Entity extraction from free-text questions.

/// Canonical state names recognized in questions
pub const STATES: [&str; 29] = [
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Andaman and Nicobar Islands",
];

/// Crop names recognized in crop market questions
pub const KNOWN_CROPS: [&str; 24] = [
    "rice", "wheat", "maize", "cotton", "sugarcane", "barley", "jowar", "bajra", "ragi", "pulses",
    "tur", "urad", "moong", "gram", "mustard", "groundnut", "soybean", "potato", "onion", "banana",
    "mango", "apple", "coffee", "tea",
];

/// States whose name occurs anywhere in the question, case-insensitively
pub fn extract_states(question: &str) -> Vec<&'static str> {
    let question = question.to_lowercase();
    STATES
        .iter()
        .copied()
        .filter(|state| question.contains(&state.to_lowercase()))
        .collect()
}

/// Crops whose name occurs anywhere in the question
///
/// Containment is by substring, so "rice" also matches inside "price".
/// Returns `None` when no crop matched, never an empty list.
pub fn extract_crops(question: &str) -> Option<Vec<&'static str>> {
    let question = question.to_lowercase();
    let crops: Vec<&'static str> = KNOWN_CROPS
        .iter()
        .copied()
        .filter(|crop| question.contains(crop))
        .collect();

    if crops.is_empty() {
        None
    } else {
        Some(crops)
    }
}
