use serde::{Deserialize, Serialize};

use super::Record;

/// A measurable feature belonging to a site, e.g. a borehole or a sinkhole.
///
/// No ordering between the min/max pairs is enforced.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Feature {
    #[serde(rename = "ID")]
    pub id: i32,
    // TODO add a Site record once there is a table to join against.
    #[serde(rename = "SiteID")]
    pub site_id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "FeatureType")]
    pub feature_type: String,
    #[serde(rename = "Diameter")]
    pub diameter: f64,
    #[serde(rename = "DiameterMin")]
    pub diameter_min: f64,
    #[serde(rename = "DiameterMax")]
    pub diameter_max: f64,
    #[serde(rename = "FeatureQuantity")]
    pub feature_quantity: i32,
    #[serde(rename = "LengthMin")]
    pub length_min: f64,
    #[serde(rename = "WidthMin")]
    pub width_min: f64,
    #[serde(rename = "WidthMax")]
    pub width_max: f64,
    #[serde(rename = "Depth")]
    pub depth: f64,
    #[serde(rename = "Shape")]
    pub shape: String,
}

impl Feature {
    pub const TABLE_NAME: &'static str = "Features";

    pub fn table_name(&self) -> &'static str {
        Self::TABLE_NAME
    }
}

impl Record for Feature {
    const CLASS_NAME: &'static str = "Feature";
    const TABLE_NAME: &'static str = Feature::TABLE_NAME;
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "SiteID",
        "Name",
        "FeatureType",
        "Diameter",
        "DiameterMin",
        "DiameterMax",
        "FeatureQuantity",
        "LengthMin",
        "WidthMin",
        "WidthMax",
        "Depth",
        "Shape",
    ];
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rstest::{fixture, rstest};

    use crate::record::Record;

    use super::Feature;

    #[fixture]
    fn well() -> Feature {
        Feature {
            id: 1,
            site_id: 42,
            name: "Well A".to_string(),
            feature_type: "Borehole".to_string(),
            diameter: 12.5,
            diameter_min: 10.0,
            diameter_max: 15.0,
            feature_quantity: 1,
            length_min: 0.0,
            width_min: 0.0,
            width_max: 0.0,
            depth: 30.0,
            shape: "Circular".to_string(),
        }
    }

    #[rstest]
    fn test_default_feature_is_empty() {
        let feature = Feature::default();
        assert_eq!(feature.id, 0);
        assert_eq!(feature.site_id, 0);
        assert_eq!(feature.name, "");
        assert_eq!(feature.feature_type, "");
        assert_eq!(feature.diameter, 0.0);
        assert_eq!(feature.diameter_min, 0.0);
        assert_eq!(feature.diameter_max, 0.0);
        assert_eq!(feature.feature_quantity, 0);
        assert_eq!(feature.length_min, 0.0);
        assert_eq!(feature.width_min, 0.0);
        assert_eq!(feature.width_max, 0.0);
        assert_eq!(feature.depth, 0.0);
        assert_eq!(feature.shape, "");
    }

    #[rstest]
    fn test_setting_one_field_leaves_others_untouched() {
        let mut feature = Feature::default();
        feature.name = "Sinkhole-12".to_string();
        assert_eq!(feature.name, "Sinkhole-12");
        assert_eq!(
            feature,
            Feature {
                name: "Sinkhole-12".to_string(),
                ..Default::default()
            }
        );
    }

    #[rstest]
    fn test_fields_read_back_exactly(well: Feature) {
        assert_eq!(well.id, 1);
        assert_eq!(well.site_id, 42);
        assert_eq!(well.name, "Well A");
        assert_eq!(well.feature_type, "Borehole");
        assert_eq!(well.diameter, 12.5);
        assert_eq!(well.diameter_min, 10.0);
        assert_eq!(well.diameter_max, 15.0);
        assert_eq!(well.feature_quantity, 1);
        assert_eq!(well.length_min, 0.0);
        assert_eq!(well.width_min, 0.0);
        assert_eq!(well.width_max, 0.0);
        assert_eq!(well.depth, 30.0);
        assert_eq!(well.shape, "Circular");
    }

    #[rstest]
    fn test_table_name(well: Feature) {
        assert_eq!(Feature::TABLE_NAME, "Features");
        assert_eq!(well.table_name(), "Features");
        assert_eq!(<Feature as Record>::TABLE_NAME, "Features");
    }

    #[rstest]
    fn test_columns_match_serialized_keys(well: Feature) {
        let value = serde_yaml::to_value(&well).unwrap();
        let keys: Vec<&str> = value
            .as_mapping()
            .unwrap()
            .keys()
            .map(|key| key.as_str().unwrap())
            .collect();
        assert_eq!(keys, Feature::COLUMNS);
    }

    #[rstest]
    fn test_deserialize_partial_record() {
        let contents = "ID: 7\nSiteID: 3\nName: Pit\nDiameter: 2.75\nDepth: 1.2\n";
        let feature: Feature = serde_yaml::from_str(contents).unwrap();
        assert_eq!(feature.id, 7);
        assert_eq!(feature.site_id, 3);
        assert_eq!(feature.name, "Pit");
        assert_abs_diff_eq!(feature.diameter, 2.75);
        assert_abs_diff_eq!(feature.depth, 1.2);
        // Missing properties fall back to their defaults.
        assert_eq!(feature.shape, "");
        assert_eq!(feature.feature_quantity, 0);
    }

    #[rstest]
    fn test_min_max_order_is_not_enforced(mut well: Feature) {
        well.diameter_min = 20.0;
        assert!(well.diameter_min > well.diameter_max);
    }
}
