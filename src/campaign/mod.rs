use serde_json::Value;

pub mod date;
pub mod db;
pub mod manager;

pub const UNDER_DEVELOPMENT: &str = "under development";

pub const ID: &str = "_id";
pub const STATUS: &str = "campaignstatus";
pub const CREATED_AT: &str = "createdat";
pub const START_DATE: &str = "startdate";
pub const END_DATE: &str = "enddate";

pub fn status(campaign: &Value) -> Option<&str> {
    campaign.get(STATUS)?.as_str()
}

pub fn created_at(campaign: &Value) -> Option<&Value> {
    campaign.get(CREATED_AT)
}

pub fn start_date(campaign: &Value) -> Option<&Value> {
    campaign.get(START_DATE)
}

pub fn end_date(campaign: &Value) -> Option<&Value> {
    campaign.get(END_DATE)
}

pub fn set_dates(campaign: &mut Value, start: Value, end: Value) {
    if let Value::Object(fields) = campaign {
        fields.insert(START_DATE.to_string(), start);
        fields.insert(END_DATE.to_string(), end);
    }
}

// used in diagnostics, falls back to the position in the store when there is no usable _id
pub fn label(campaign: &Value, index: usize) -> String {
    match campaign.get(ID) {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        Some(Value::Object(id)) => match id.get("$oid").and_then(Value::as_str) {
            Some(oid) => oid.to_string(),
            None => Value::Object(id.clone()).to_string(),
        },
        _ => format!("#{}", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_prefers_object_id() {
        let campaign = json!({ "_id": { "$oid": "65a1f0c2e4b0a1b2c3d4e5f6" } });

        assert_eq!(label(&campaign, 7), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(label(&json!({ "_id": "cmp-1" }), 7), "cmp-1");
        assert_eq!(label(&json!({ "_id": 12 }), 7), "12");
        assert_eq!(label(&json!({ "name": "Spring Sale" }), 7), "#7");
    }

    #[test]
    fn set_dates_keeps_field_order() {
        let mut campaign = json!({
            "_id": "cmp-1",
            "startdate": null,
            "campaignstatus": "under development",
            "enddate": null,
        });

        set_dates(&mut campaign, json!("start"), json!("end"));

        let keys: Vec<_> = campaign.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["_id", "startdate", "campaignstatus", "enddate"]);
        assert_eq!(start_date(&campaign), Some(&json!("start")));
        assert_eq!(end_date(&campaign), Some(&json!("end")));
        assert_eq!(status(&campaign), Some(UNDER_DEVELOPMENT));
    }

    #[test]
    fn set_dates_ignores_non_objects() {
        let mut campaign = json!(["not", "a", "campaign"]);

        set_dates(&mut campaign, json!("start"), json!("end"));

        assert_eq!(campaign, json!(["not", "a", "campaign"]));
    }
}
