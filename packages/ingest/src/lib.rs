#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Run orchestration for the lead-map sync job.
//!
//! One invocation is one full run: pull the service line records, spatialize
//! and clean them, replace the points layer, then reconcile the system
//! sheets against the boundary layer and replace the areas layer, finishing
//! with a summary mail to the operators. Stages run strictly in sequence;
//! data-quality findings accumulate in reports while transport failures
//! abort the run.

pub mod config;
pub mod secrets;

use chrono::Local;
use lead_map_agol::columns::normalize_for_destination;
use lead_map_agol::{Feature, FeatureLoader as _, ServiceUpdater};
use lead_map_notify::{
    MessageDetails, MissingGeometryLine, RunSummary, SendGridHandler, SendGridSettings,
};
use lead_map_points::{CleanedPoint, clean, spatialize};
use lead_map_source::feature_service::{self, LayerQuery};
use lead_map_source::graphql::{self, GraphqlQuery};
use lead_map_source::gsheet::{self, WorksheetRef};
use lead_map_source::table::SheetTable;
use lead_map_source_models::parse_records;
use lead_map_spatial::WEB_MERCATOR_WKID;
use lead_map_systems::approved::clean_approved;
use lead_map_systems::areas::clean_service_areas;
use lead_map_systems::links::clean_links;
use lead_map_systems::merge::{ReconciledSystem, merge_systems};

use crate::config::SkidConfig;
use crate::secrets::Secrets;

/// Runs one full sync.
///
/// # Errors
///
/// Returns an error on any transport or malformed-response failure; the
/// remaining stages are skipped and no summary mail is sent. Data-quality
/// findings never fail the run; they ride along into the summary.
#[allow(clippy::too_many_lines)]
pub async fn process(
    secrets: &Secrets,
    config: &SkidConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Local::now();
    let client = reqwest::Client::builder()
        .user_agent(concat!("lead-map/", env!("CARGO_PKG_VERSION")))
        .build()?;

    // ── Points ───────────────────────────────────────────────────────
    log::info!("Loading data from graphql endpoint...");
    let raw_records = graphql::fetch_records(
        &client,
        &GraphqlQuery {
            url: &secrets.graphql_url,
            query: &config.graphql.query,
            collection: &config.graphql.collection,
            page_size: config.graphql.page_size,
        },
        config.graphql.max_pages,
    )
    .await?;
    let records = parse_records(raw_records)?;
    log::info!("{} service line records fetched", records.len());

    log::info!("Transforming data...");
    let spatialized = spatialize(records)?;
    let missing_coords: Vec<(String, String)> = spatialized
        .missing_coords
        .iter()
        .map(|record| {
            (
                record.pws_id.clone().unwrap_or_default(),
                record.pws_name.clone().unwrap_or_default(),
            )
        })
        .collect();
    let cleaned = clean(spatialized.points);

    log::info!("Loading point data...");
    let updater = ServiceUpdater::connect(
        client.clone(),
        &config.agol_org,
        &secrets.agol_user,
        &secrets.agol_password,
    )
    .await?;
    let points_loaded = updater
        .truncate_and_load(&config.layers.points_url, &point_features(&cleaned))
        .await?;

    // ── Areas ────────────────────────────────────────────────────────
    log::info!("Loading system area data from Google Sheets...");
    let systems_grid = gsheet::load_worksheet(
        &client,
        &secrets.sheets_api_key,
        &WorksheetRef {
            spreadsheet_id: &secrets.sheet_id,
            tab: &secrets.sheet_name,
        },
    )
    .await?;
    let approved = clean_approved(&SheetTable::from_grid_skipping_artifact_row(systems_grid)?);

    let links_grid = gsheet::load_worksheet(
        &client,
        &secrets.sheets_api_key,
        &WorksheetRef {
            spreadsheet_id: &secrets.links_id,
            tab: &secrets.links_name,
        },
    )
    .await?;
    let links = clean_links(&SheetTable::from_grid(links_grid)?);

    log::info!("Loading service area geometries...");
    let layer_features = feature_service::query_layer(
        &client,
        &LayerQuery {
            url: &config.layers.service_areas_source_url,
            page_size: config.feature_service.page_size,
            out_wkid: WEB_MERCATOR_WKID,
        },
    )
    .await?;
    let areas = clean_service_areas(layer_features);

    log::info!("Merging systems with geometries...");
    let merged = merge_systems(approved.systems, links.links, &areas);

    log::info!("Loading system area data to AGOL...");
    let areas_loaded = updater
        .truncate_and_load(&config.layers.areas_url, &area_features(&merged.reconciled))
        .await?;

    // ── Summary ──────────────────────────────────────────────────────
    let end = Local::now();
    let summary = RunSummary {
        skid_name: config.skid_name.clone(),
        start,
        end,
        points_loaded,
        areas_loaded,
        missing_coords,
        invalid_pwsids: approved.invalid_pwsids,
        duplicate_link_pwsids: links.duplicate_pwsids,
        missing_geometries: merged
            .missing_geometries
            .iter()
            .map(|(pwsid, missing)| MissingGeometryLine {
                pwsid: *pwsid,
                system_name: missing.system_name.clone().unwrap_or_default(),
                classification: missing.classification.clone().unwrap_or_default(),
                area_type: missing.area_type.to_string(),
            })
            .collect(),
    };

    let handler = SendGridHandler::new(
        secrets.sendgrid_api_key.clone(),
        SendGridSettings {
            from_address: config.mail.from_address.clone(),
            to_addresses: config.mail.to_addresses.clone(),
            prefix: format!("{}: ", config.skid_name),
        },
    );
    handler
        .notify(
            &client,
            &MessageDetails {
                subject: summary.subject(),
                body: summary.body(),
                attachment: None,
            },
        )
        .await?;

    log::info!(
        "Run complete: {points_loaded} points, {areas_loaded} areas in {}s",
        (end - start).num_seconds()
    );
    Ok(())
}

/// Builds destination features for the points layer.
fn point_features(points: &[CleanedPoint]) -> Vec<Feature> {
    points
        .iter()
        .map(|point| Feature {
            attributes: point.attributes.clone(),
            geometry: Some(serde_json::json!({
                "x": point.geometry.x(),
                "y": point.geometry.y(),
                "spatialReference": { "wkid": WEB_MERCATOR_WKID },
            })),
        })
        .collect()
}

/// Builds destination features for the areas layer: boundary attributes
/// plus the tabular system columns, renamed to the destination convention.
fn area_features(reconciled: &[ReconciledSystem]) -> Vec<Feature> {
    reconciled
        .iter()
        .map(|row| {
            let mut attributes = row.area_attributes.clone();
            attributes.insert("PWSID".to_owned(), serde_json::json!(row.system.pwsid));
            attributes.insert(
                "System Name".to_owned(),
                optional_string(row.system.system_name.as_deref()),
            );
            attributes.insert(
                "Approved".to_owned(),
                optional_string(row.system.approved.as_deref()),
            );
            attributes.insert(
                "SC, LC, on NTNC".to_owned(),
                optional_string(row.system.classification.as_deref()),
            );
            attributes.insert("link".to_owned(), optional_string(row.system.link.as_deref()));
            attributes.insert(
                "submitted_time".to_owned(),
                row.system.submitted_time.map_or(serde_json::Value::Null, |time| {
                    // Esri date fields carry epoch milliseconds.
                    serde_json::json!(time.and_utc().timestamp_millis())
                }),
            );
            attributes.insert(
                "area_type".to_owned(),
                serde_json::json!(row.system.area_type.to_string()),
            );

            Feature {
                attributes: normalize_for_destination(attributes),
                geometry: row.geometry.clone(),
            }
        })
        .collect()
}

fn optional_string(value: Option<&str>) -> serde_json::Value {
    value.map_or(serde_json::Value::Null, |s| serde_json::json!(s))
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use lead_map_systems::AreaType;
    use lead_map_systems::merge::SystemRow;
    use serde_json::json;

    use super::*;

    #[test]
    fn point_features_carry_web_mercator_geometry() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("pws_id".to_owned(), json!("UTAH1234"));
        let features = point_features(&[CleanedPoint {
            geometry: Point::new(-12_455_649.0, 4_977_862.0),
            attributes,
        }]);

        let geometry = features[0].geometry.as_ref().unwrap();
        assert_eq!(geometry["spatialReference"]["wkid"], json!(3857));
        assert_eq!(geometry["x"], json!(-12_455_649.0));
        assert_eq!(features[0].attributes["pws_id"], json!("UTAH1234"));
    }

    #[test]
    fn area_features_rename_columns_and_drop_metrics() {
        let mut area_attributes = serde_json::Map::new();
        area_attributes.insert("FID".to_owned(), json!(7));
        area_attributes.insert("DWSYSNUM".to_owned(), json!("UTAH1234"));
        area_attributes.insert("Shape__Area".to_owned(), json!(10.0));
        area_attributes.insert("Shape__Length".to_owned(), json!(13.0));

        let features = area_features(&[ReconciledSystem {
            system: SystemRow {
                pwsid: 1234,
                system_name: Some("Central Valley".to_owned()),
                approved: Some("Yes".to_owned()),
                classification: Some("SC".to_owned()),
                link: None,
                submitted_time: lead_map_source::parsing::parse_mixed_timestamp("1/2/2024"),
                area_type: AreaType::ApprovedSystem,
            },
            area_attributes,
            geometry: Some(json!({ "rings": [] })),
        }]);

        let attributes = &features[0].attributes;
        assert_eq!(attributes["pwsid"], json!(1234));
        assert_eq!(attributes["system_name"], json!("Central Valley"));
        assert_eq!(attributes["sc__lc__on_ntnc"], json!("SC"));
        assert_eq!(attributes["area_type"], json!("Approved System"));
        assert_eq!(attributes["dwsysnum"], json!("UTAH1234"));
        assert_eq!(attributes["link"], serde_json::Value::Null);
        // 2024-01-02 midnight UTC in epoch milliseconds.
        assert_eq!(attributes["submitted_time"], json!(1_704_153_600_000_i64));
        assert!(!attributes.contains_key("shape__area"));
        assert!(!attributes.contains_key("shape__length"));
        assert!(features[0].geometry.is_some());
    }
}
