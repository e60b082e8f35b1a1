//! Employee resolution from terminal-supplied identifiers
//!
//! Terminals store employee identifiers inconsistently: leading zeros
//! trimmed or not, numeric vs. string. Resolution is a staged,
//! short-circuiting search over the employee store:
//!
//! 1. exact matricule match on the raw identifier;
//! 2. exact match on the normalized form (leading zeros dropped);
//! 3. set-membership over zero-left-padded variants of the normalized form;
//! 4. numeric-equality cast, for fully numeric identifiers only.
//!
//! Malformed input never errors out of a stage; it simply fails to match.

use atn_common::db::models::Employee;
use atn_common::repo::EmployeeRepository;
use atn_common::Result;
use tracing::debug;

/// Normalize a raw matricule string.
///
/// All-zero strings collapse to `"0"`; all-digit strings drop their
/// leading zeros; anything else passes through trimmed.
pub fn normalize_matricule(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if trimmed.bytes().all(|b| b == b'0') {
        return "0".to_string();
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        // Stripping zeros is the overflow-proof spelling of
        // parse-to-integer-and-restringify
        return trimmed.trim_start_matches('0').to_string();
    }

    trimmed.to_string()
}

/// Zero-left-padded variants of a normalized matricule, up to `max_width`
/// characters. Non-numeric matricules have no variants beyond themselves.
pub fn matricule_variants(normalized: &str, max_width: usize) -> Vec<String> {
    let mut variants = vec![normalized.to_string()];

    if normalized.is_empty() || !normalized.bytes().all(|b| b.is_ascii_digit()) {
        return variants;
    }

    for padding in 1..=max_width.saturating_sub(normalized.len()) {
        variants.push(format!("{}{}", "0".repeat(padding), normalized));
    }

    variants
}

/// Staged matricule resolution against the employee store.
///
/// Returns `Ok(None)` only after all four stages miss.
pub async fn resolve(
    employees: &dyn EmployeeRepository,
    tenant_id: &str,
    raw_identifier: &str,
    pad_width: usize,
) -> Result<Option<Employee>> {
    let raw = raw_identifier.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    // Stage 1: exact match on the identifier as the terminal sent it
    if let Some(employee) = employees.find_by_matricule(tenant_id, raw).await? {
        debug!(tenant_id, matricule = raw, "resolved by exact match");
        return Ok(Some(employee));
    }

    // Stage 2: exact match on the normalized form, when it differs
    let normalized = normalize_matricule(raw);
    if normalized != raw {
        if let Some(employee) = employees.find_by_matricule(tenant_id, &normalized).await? {
            debug!(tenant_id, matricule = %normalized, "resolved by normalization");
            return Ok(Some(employee));
        }
    }

    // Stage 3: zero-padded variants plus the original raw string
    let mut candidates = matricule_variants(&normalized, pad_width);
    if !candidates.iter().any(|c| c == raw) {
        candidates.push(raw.to_string());
    }
    if let Some(employee) = employees.find_by_matricule_any(tenant_id, &candidates).await? {
        debug!(tenant_id, matricule = raw, "resolved by padded variant");
        return Ok(Some(employee));
    }

    // Stage 4: last-resort numeric cast, numeric identifiers only
    if normalized.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(value) = normalized.parse::<i64>() {
            if let Some(employee) =
                employees.find_by_numeric_matricule(tenant_id, value).await?
            {
                debug!(tenant_id, matricule = raw, "resolved by numeric cast");
                return Ok(Some(employee));
            }
        }
    }

    Ok(None)
}
