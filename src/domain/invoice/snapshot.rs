use serde::{Deserialize, Serialize};

use super::entities::Client;
use super::value_objects::ClientAddress;

/// Client identity copied onto an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSnapshot {
  pub name: String,
  pub business_name: Option<String>,
  pub email: Option<String>,
  pub address: Option<String>,
}

impl ClientSnapshot {
  pub fn of(client: &Client) -> Self {
    Self {
      name: client.name.value().to_string(),
      business_name: present(&client.business_name).map(str::to_string),
      email: client.email.as_ref().map(|e| e.as_str().to_string()),
      address: format_address(&client.address),
    }
  }
}

/// Renders an address as up to three lines:
/// street lines, "{city}, {state} {postal}", country.
pub fn format_address(address: &ClientAddress) -> Option<String> {
  let mut lines = Vec::new();

  let street: Vec<&str> = [&address.line1, &address.line2]
    .into_iter()
    .filter_map(present)
    .collect();
  if !street.is_empty() {
    lines.push(street.join(", "));
  }

  let city_state: Vec<&str> = [&address.city, &address.state]
    .into_iter()
    .filter_map(present)
    .collect();
  let city_state = city_state.join(", ");
  let locality = match present(&address.postal_code) {
    Some(postal) if city_state.is_empty() => postal.to_string(),
    Some(postal) => format!("{} {}", city_state, postal),
    None => city_state,
  };
  if !locality.is_empty() {
    lines.push(locality);
  }

  if let Some(country) = present(&address.country) {
    lines.push(country.to_string());
  }

  if lines.is_empty() {
    None
  } else {
    Some(lines.join("\n"))
  }
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
