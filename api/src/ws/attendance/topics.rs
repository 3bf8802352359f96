/// Private channel of one trainee.
pub fn trainee_topic(username: &str) -> String {
    format!("trainee:{username}")
}

/// Shared channel of a class.
pub fn class_topic(class: &str) -> String {
    format!("class:{class}")
}
