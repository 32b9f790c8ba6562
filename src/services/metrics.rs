use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    pub static ref LOGINS_COUNTER: CounterVec = register_counter_vec!(
        "api_logins_total",
        "Admin login attempts by status",
        &["status"]
    ).unwrap();

    pub static ref IMAGE_UPLOADS_COUNTER: CounterVec = register_counter_vec!(
        "api_image_uploads_total",
        "Images stored, by owning entity",
        &["kind"]
    ).unwrap();

    pub static ref MENU_CHANGES_COUNTER: CounterVec = register_counter_vec!(
        "api_menu_changes_total",
        "Admin mutations by entity and action",
        &["entity", "action"]
    ).unwrap();
}

pub fn record_login(success: bool) {
    LOGINS_COUNTER
        .with_label_values(&[if success { "success" } else { "failure" }])
        .inc();
}

pub fn record_change(entity: &str, action: &str) {
    MENU_CHANGES_COUNTER.with_label_values(&[entity, action]).inc();
}

pub fn record_upload(kind: &str) {
    IMAGE_UPLOADS_COUNTER.with_label_values(&[kind]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let before = MENU_CHANGES_COUNTER
            .with_label_values(&["temporary_price", "duplicate"])
            .get();
        record_change("temporary_price", "duplicate");
        let after = MENU_CHANGES_COUNTER
            .with_label_values(&["temporary_price", "duplicate"])
            .get();
        assert_eq!(after, before + 1.0);
    }
}
