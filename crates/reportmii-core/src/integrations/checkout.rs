//! Hosted checkout -- builds the payment page redirect for add-on blocks.
//!
//! Payment itself happens on the provider's page; this side only encodes the
//! analysis and the billed quantity into the redirect URL.

use url::Url;

use crate::error::IntegrationError;
use crate::integrations::traits::{CheckoutProvider, CheckoutSession};

pub struct HostedCheckout {
    base_url: Url,
}

impl HostedCheckout {
    /// # Errors
    /// Returns an error if `base_url` is empty, unparsable or not http(s).
    pub fn new(base_url: &str) -> Result<Self, IntegrationError> {
        if base_url.trim().is_empty() {
            return Err(IntegrationError::NotConfigured {
                service: "checkout".to_string(),
            });
        }
        let base_url = Url::parse(base_url.trim())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(IntegrationError::Unavailable {
                service: "checkout".to_string(),
                message: format!("unsupported URL scheme '{}'", base_url.scheme()),
            });
        }
        Ok(Self { base_url })
    }

    /// Open the checkout page in the user's browser.
    pub fn open_in_browser(session: &CheckoutSession) -> Result<(), IntegrationError> {
        open::that(&session.url).map_err(|e| IntegrationError::Unavailable {
            service: "browser".to_string(),
            message: e.to_string(),
        })
    }
}

impl CheckoutProvider for HostedCheckout {
    fn name(&self) -> &str {
        "hosted"
    }

    fn create_checkout(
        &self,
        analysis_id: &str,
        quantity: usize,
        amount: u64,
        currency: &str,
    ) -> Result<CheckoutSession, IntegrationError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("analysis", analysis_id)
            .append_pair("quantity", &quantity.to_string())
            .append_pair("amount", &amount.to_string())
            .append_pair("currency", currency);

        Ok(CheckoutSession {
            url: url.into(),
            quantity,
            amount,
            currency: currency.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_url_carries_quantity() {
        let checkout = HostedCheckout::new("https://pay.example.com/addons?plan=pro").unwrap();
        let session = checkout.create_checkout("a 1", 2, 78, "EUR").unwrap();

        let url = Url::parse(&session.url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("plan".into(), "pro".into())));
        assert!(pairs.contains(&("analysis".into(), "a 1".into())));
        assert!(pairs.contains(&("quantity".into(), "2".into())));
        assert!(pairs.contains(&("amount".into(), "78".into())));
        assert_eq!(session.amount, 78);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            HostedCheckout::new(""),
            Err(IntegrationError::NotConfigured { .. })
        ));
        assert!(matches!(
            HostedCheckout::new("not a url"),
            Err(IntegrationError::InvalidUrl(_))
        ));
        assert!(HostedCheckout::new("ftp://pay.example.com").is_err());
    }
}
