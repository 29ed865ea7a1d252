//! Reply validation: the text must be a JSON object with all four verdict
//! fields present, string-typed and non-empty. No partial recovery.
use court_core::{Party, Verdict, VerdictError};
use serde_json::{Map, Value};

pub fn parse_verdict(text: &str) -> Result<Verdict, VerdictError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| VerdictError::MalformedResponse(format!("reply is not valid JSON: {}", e)))?;

    let Value::Object(object) = value else {
        return Err(VerdictError::MalformedResponse(
            "reply is not a JSON object".to_string(),
        ));
    };

    let winner_label = required_field(&object, "winner")?;
    let winner = Party::parse(winner_label).ok_or_else(|| {
        VerdictError::MalformedResponse(format!(
            "winner must be Plaintiff or Defendant, got '{}'",
            winner_label
        ))
    })?;

    Ok(Verdict {
        winner,
        sentence: required_field(&object, "sentence")?.to_string(),
        roast: required_field(&object, "roast")?.to_string(),
        detailed_verdict: required_field(&object, "detailed_verdict")?.to_string(),
    })
}

fn required_field<'a>(object: &'a Map<String, Value>, name: &str) -> Result<&'a str, VerdictError> {
    match object.get(name) {
        None | Some(Value::Null) => Err(VerdictError::MalformedResponse(format!(
            "missing field '{}'",
            name
        ))),
        Some(Value::String(s)) if s.trim().is_empty() => Err(VerdictError::MalformedResponse(
            format!("field '{}' is empty", name),
        )),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(VerdictError::MalformedResponse(format!(
            "field '{}' is not a string",
            name
        ))),
    }
}
