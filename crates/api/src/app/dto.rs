use serde::Deserialize;

use jobsheet_core::{IntakeForm, JobRecord, ShopTimezone};

/// Body of `POST /jobsheets`.
///
/// Every field is optional on the wire so that missing fields reach intake
/// validation and come back as one `validation_error` naming all of them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateJobsheetRequest {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub symptom: Option<String>,
}

impl CreateJobsheetRequest {
    pub fn into_form(self) -> IntakeForm {
        IntakeForm {
            customer_name: self.customer_name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            serial: self.serial.unwrap_or_default(),
            symptom: self.symptom.unwrap_or_default(),
        }
    }
}

pub fn jobsheet_to_json(record: &JobRecord, timezone: &ShopTimezone) -> serde_json::Value {
    serde_json::json!({
        "code": record.code.as_str(),
        "date": record.date.format("%Y-%m-%d").to_string(),
        "daily_counter": record.daily_counter.get(),
        "customer_name": record.customer_name,
        "phone": record.phone,
        "model": record.model,
        "serial": record.serial,
        "symptom": record.symptom,
        "created_at": record.created_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        "created_at_local": timezone.format_local(record.created_at),
    })
}
