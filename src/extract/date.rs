use crate::ExtractError;
use chrono::NaiveDate;

/// Date layouts seen in article listings, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y", "%d %B %Y"];

/// Parses the date text of an article entry
///
/// Surrounding and repeated whitespace is ignored.
///
/// # Examples
///
/// ```
/// use byline_harvest::extract::parse_article_date;
/// use chrono::NaiveDate;
///
/// let date = parse_article_date(" September 14, 2017 ").unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2017, 9, 14).unwrap());
/// ```
pub fn parse_article_date(text: &str) -> Result<NaiveDate, ExtractError> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .ok_or(ExtractError::InvalidDate(cleaned))
}
