use serde_json::{Value, json};
use std::io::{Error, Write};
use tempfile::NamedTempFile;

pub fn write_script(lines: &[Value]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(file)
}

pub fn invoke(method: &str, args: Value) -> Value {
    json!({"invoke": {"method": method, "args": args}})
}

pub fn card() -> Value {
    json!({"number": "4242424242424242", "expMonth": 12, "expYear": 2030, "cvc": "123"})
}

pub fn intent_result(request_code: u32, status: &str) -> Value {
    json!({"activityResult": {
        "requestCode": request_code,
        "resultCode": "ok",
        "data": {"intent": {"id": "pi_1", "status": status}}
    }})
}

/// Parses the CLI's JSON-lines output.
pub fn replies(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("reply line is JSON"))
        .collect()
}
