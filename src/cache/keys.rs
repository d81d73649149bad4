//! Cache key scheme.
//!
//! Every resource kind owns a distinct prefix, so equal entity ids never
//! collide across kinds.

pub fn invoices(customer_id: &str) -> String {
    format!("invoices:{customer_id}")
}

pub fn payments(customer_id: &str) -> String {
    format!("payments:{customer_id}")
}

pub fn usage(customer_id: &str) -> String {
    format!("usage:{customer_id}")
}

pub fn invoice_pdf(invoice_id: &str) -> String {
    format!("pdf:invoice:{invoice_id}")
}

pub fn credit_bundles(customer_id: &str) -> String {
    format!("credit-bundles:{customer_id}")
}

pub fn alert_rules(customer_id: &str) -> String {
    format!("alert-rules:{customer_id}")
}

pub fn plan_groups(customer_id: &str) -> String {
    format!("plan-groups:{customer_id}")
}

/// All customer-scoped keys for one customer.
pub fn customer_keys(customer_id: &str) -> [String; 6] {
    [
        invoices(customer_id),
        payments(customer_id),
        usage(customer_id),
        credit_bundles(customer_id),
        alert_rules(customer_id),
        plan_groups(customer_id),
    ]
}
