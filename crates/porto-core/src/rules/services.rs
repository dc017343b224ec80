//! `global_settings.available_services` and service/price discontinuation dates.

use crate::findings::ValidationResults;
use crate::rules::{Rule, RuleContext};

pub struct AvailableServicesRule;

impl Rule for AvailableServicesRule {
    fn id(&self) -> &str {
        "services.available"
    }

    fn check(&self, ctx: &RuleContext<'_>, results: &mut ValidationResults) {
        let available = &ctx.docs.data_links.global_settings.available_services;

        for service_id in available {
            if !ctx.index.service_ids().contains_key(service_id.as_str()) {
                results.error(format!(
                    "Service '{service_id}' in available_services does not exist in {}. {}",
                    ctx.files.services,
                    ctx.found_in(&["global_settings", "available_services"])
                ));
            }
        }

        let priced = ctx.index.priced_service_ids();
        for service_id in available {
            if !priced.contains(service_id.as_str()) {
                results.warning(format!(
                    "Service '{service_id}' is listed as available but has no price in {}",
                    ctx.files.prices
                ));
            }
        }

        check_effective_dates(ctx, results);
    }
}

/// A discontinued price (first non-null `effective_to` in its history) needs
/// a service discontinued on the same date.
fn check_effective_dates(ctx: &RuleContext<'_>, results: &mut ValidationResults) {
    let locations = format!(
        "Price found in: {} -> prices -> service_prices. Service found in: {} -> services",
        ctx.files.prices, ctx.files.services
    );

    for entry in ctx.index.service_prices {
        let Some(service_id) = entry.service_id.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        let Some(price_to) = entry.first_effective_to() else {
            continue;
        };

        let Some(service) = ctx.index.services_by_id.get(service_id) else {
            results.error(format!(
                "Service '{service_id}' has prices but service not found in {}",
                ctx.files.services
            ));
            continue;
        };

        match service.effective_to.as_deref() {
            None => results.error(format!(
                "Service '{service_id}' has prices with effective_to='{price_to}' but service does not have effective_to set. Service must be marked as discontinued when prices are discontinued. {locations}"
            )),
            Some(service_to) if service_to != price_to => results.error(format!(
                "Service '{service_id}' has price effective_to='{price_to}' but service effective_to='{service_to}'. Dates must match. {locations}"
            )),
            Some(_) => {}
        }
    }
}
