use cityweather_core::{Document, ElementId};
use std::fmt;

/// Labels of the scalar fields, in display order.
const FIELDS: &[(ElementId, &str)] = &[
    (ElementId::CurrentTemp, "Temperature"),
    (ElementId::CurrentPressure, "Pressure"),
    (ElementId::CurrentRain, "Rain"),
    (ElementId::CurrentHumidity, "Humidity"),
    (ElementId::CurrentCloud, "Cloud cover"),
    (ElementId::CurrentWindSpeed, "Wind speed"),
    (ElementId::CurrentWindDirection, "Wind direction"),
    (ElementId::TomorrowMin, "Tomorrow min"),
    (ElementId::TomorrowMax, "Tomorrow max"),
];

/// Text form of the visible parts of the document.
///
/// Hidden elements print nothing; empty optional fields are skipped.
pub fn document(doc: &Document) -> String {
    Visible(doc).to_string()
}

struct Visible<'a>(&'a Document);

impl fmt::Display for Visible<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.0;

        if !doc.is_hidden(ElementId::ErrorMessage) {
            writeln!(f, "Error: {}", doc.text(ElementId::ErrorMessage))?;
        }

        if doc.is_hidden(ElementId::WeatherContainer) {
            return Ok(());
        }

        writeln!(f, "{}", doc.text(ElementId::CityName))?;
        for (id, label) in FIELDS {
            let text = doc.text(*id);
            if !text.is_empty() {
                writeln!(f, "  {label:<15} {text}")?;
            }
        }

        let rows = doc.rows(ElementId::HourlyContainer);
        if !rows.is_empty() {
            writeln!(f, "  Hourly:")?;
            for row in rows {
                write!(f, "    {:<8} {:>8}", row.time, row.temp)?;
                if let Some(rain) = &row.rain {
                    write!(f, "  {rain}")?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}
