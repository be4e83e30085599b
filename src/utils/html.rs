use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Used on free text coming back from the recommendation model before it is
/// handed to the frontend, which renders it as rich text. Safe tags (like
/// <b>, <p>) survive; <script>, <iframe> and event-handler attributes do not.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
