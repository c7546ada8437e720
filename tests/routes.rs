use actix_web_flash_messages::Level;
use recordsdesk::dto::clients::ClientsQuery;
use recordsdesk::routes::{alert_level_to_str, page_base};

#[test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[test]
fn page_links_keep_filters() {
    let query = ClientsQuery {
        search: Some("smith".into()),
        status: Some("active".into()),
        ..Default::default()
    };
    assert_eq!(
        page_base("/clients", &query),
        "/clients?search=smith&status=active&"
    );
    assert_eq!(page_base("/clients", &ClientsQuery::default()), "/clients?");
}
