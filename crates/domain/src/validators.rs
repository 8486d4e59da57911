/// Hostname syntax check (RFC 1123 labels, underscore tolerated for SRV-style names).
pub fn validate_hostname(name: &str) -> Result<(), String> {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() {
        return Err("hostname cannot be empty".to_string());
    }
    if name.len() > 253 {
        return Err("hostname cannot exceed 253 characters".to_string());
    }
    for label in name.split('.') {
        if label.is_empty() {
            return Err(format!("hostname '{name}' contains an empty label"));
        }
        if label.len() > 63 {
            return Err(format!("label '{label}' exceeds 63 characters"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!("label '{label}' cannot start or end with '-'"));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!("label '{label}' contains invalid characters"));
        }
    }
    Ok(())
}

pub fn validate_doh_template(template: &str) -> Result<(), String> {
    if template.len() > 2048 {
        return Err("URL template cannot exceed 2048 characters".to_string());
    }
    if !template.starts_with("https://") {
        return Err("DoH URL template must start with https://".to_string());
    }
    if template.len() <= "https://".len() {
        return Err("DoH URL template has no host".to_string());
    }
    Ok(())
}
