//! The seven dashboard views derived from a filtered selection.

use super::aggregator::{count_by, cross_count_by, filter_by_column_value};
use crate::config::ReportConfig;
use crate::models::{Column, DashboardViews, FilteredView};
use tracing::debug;

/// Gender values that identify the female and male party breakdowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenderLabels {
    pub female: String,
    pub male: String,
}

impl Default for GenderLabels {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for GenderLabels {
    fn from(config: &ReportConfig) -> Self {
        Self {
            female: config.female_label.clone(),
            male: config.male_label.clone(),
        }
    }
}

/// Build every dashboard view from a filtered selection.
///
/// Both gender-keyed tables always lead with the female then the male label,
/// whatever order rows arrive in, so a gender absent from the selection
/// shows as zeros and each gender keeps its series color across selections.
pub fn build_views(view: &FilteredView<'_>, labels: &GenderLabels) -> DashboardViews {
    let women = filter_by_column_value(view, Column::Gender, &labels.female);
    let men = filter_by_column_value(view, Column::Gender, &labels.male);
    debug!(
        "Building views over {} rows ({} female, {} male)",
        view.len(),
        women.len(),
        men.len()
    );

    let mut education_by_gender = cross_count_by(view, Column::Education, Column::Gender);
    let mut party_by_gender = cross_count_by(view, Column::Party, Column::Gender);
    for table in [&mut education_by_gender, &mut party_by_gender] {
        table.lead_columns(&[labels.female.as_str(), labels.male.as_str()]);
    }

    DashboardViews {
        education: count_by(view, Column::Education),
        education_by_gender,
        race: count_by(view, Column::Race),
        gender: count_by(view, Column::Gender),
        party_female: count_by(&women, Column::Party),
        party_male: count_by(&men, Column::Party),
        party_by_gender,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::filter;
    use crate::models::{CandidateRecord, Dataset};

    fn rec(gender: &str, party: &str, education: &str) -> CandidateRecord {
        CandidateRecord {
            unit: "RECIFE".to_string(),
            office: "VEREADOR".to_string(),
            education: education.to_string(),
            gender: gender.to_string(),
            race: "PARDA".to_string(),
            party: party.to_string(),
        }
    }

    #[test]
    fn test_build_views_sums() {
        let data = Dataset::new(
            vec![
                rec("FEMININO", "PT", "SUPERIOR COMPLETO"),
                rec("MASCULINO", "PT", "SUPERIOR COMPLETO"),
                rec("MASCULINO", "PL", "ENSINO MÉDIO COMPLETO"),
                rec("NÃO DIVULGÁVEL", "PSOL", "SUPERIOR COMPLETO"),
            ],
            vec![],
        );
        let view = data.view();
        let views = build_views(&view, &GenderLabels::default());

        assert_eq!(views.education.total(), 4);
        assert_eq!(views.race.total(), 4);
        assert_eq!(views.gender.total(), 4);
        assert_eq!(views.education_by_gender.total(), 4);
        assert_eq!(views.party_by_gender.total(), 4);

        assert_eq!(views.party_female.total(), 1);
        assert_eq!(views.party_female.get("PT"), Some(1));
        assert_eq!(views.party_male.total(), 2);
        assert_eq!(views.party_male.get("PL"), Some(1));
        assert_eq!(views.party_male.get("PSOL"), None);

        assert_eq!(views.education_by_gender.get("SUPERIOR COMPLETO", "MASCULINO"), 1);
        assert_eq!(views.party_by_gender.get("PSOL", "NÃO DIVULGÁVEL"), 1);
    }

    #[test]
    fn test_single_gender_keeps_zero_column() {
        let data = Dataset::new(
            vec![
                rec("MASCULINO", "PT", "SUPERIOR COMPLETO"),
                rec("MASCULINO", "PL", "SUPERIOR COMPLETO"),
                rec("MASCULINO", "PL", "SUPERIOR COMPLETO"),
            ],
            vec![],
        );
        let view = data.view();
        let views = build_views(&view, &GenderLabels::default());

        let cross = &views.party_by_gender;
        assert!(cross.columns.contains(&"FEMININO".to_string()));
        for party in &cross.rows {
            assert_eq!(cross.get(party, "FEMININO"), 0);
        }
        assert_eq!(cross.get("PL", "MASCULINO"), 2);
        assert!(views.party_female.is_empty());
    }

    #[test]
    fn test_gender_columns_independent_of_row_order() {
        let male_first = Dataset::new(
            vec![
                rec("MASCULINO", "PT", "SUPERIOR COMPLETO"),
                rec("FEMININO", "PL", "ENSINO MÉDIO COMPLETO"),
            ],
            vec![],
        );
        let female_first = Dataset::new(
            vec![
                rec("FEMININO", "PL", "ENSINO MÉDIO COMPLETO"),
                rec("MASCULINO", "PT", "SUPERIOR COMPLETO"),
            ],
            vec![],
        );

        let a = build_views(&male_first.view(), &GenderLabels::default());
        let b = build_views(&female_first.view(), &GenderLabels::default());

        assert_eq!(a.party_by_gender.columns, b.party_by_gender.columns);
        assert_eq!(a.party_by_gender.columns, vec!["FEMININO", "MASCULINO"]);
        assert_eq!(a.education_by_gender.columns, b.education_by_gender.columns);
        assert_eq!(a.party_by_gender.get("PT", "MASCULINO"), 1);
        assert_eq!(a.party_by_gender.get("PT", "FEMININO"), 0);
    }

    #[test]
    fn test_other_gender_values_follow_labels() {
        let data = Dataset::new(
            vec![
                rec("NÃO DIVULGÁVEL", "PT", "SUPERIOR COMPLETO"),
                rec("MASCULINO", "PT", "SUPERIOR COMPLETO"),
            ],
            vec![],
        );
        let views = build_views(&data.view(), &GenderLabels::default());
        assert_eq!(
            views.party_by_gender.columns,
            vec!["FEMININO", "MASCULINO", "NÃO DIVULGÁVEL"]
        );
        assert_eq!(views.party_by_gender.total(), 2);
    }

    #[test]
    fn test_empty_selection() {
        let data = Dataset::new(vec![rec("FEMININO", "PT", "SUPERIOR COMPLETO")], vec![]);
        let view = filter(&data, "OLINDA", "PREFEITO");
        let views = build_views(&view, &GenderLabels::default());

        assert!(views.education.is_empty());
        assert!(views.gender.is_empty());
        assert!(views.party_female.is_empty());
        assert!(views.party_male.is_empty());
        assert!(views.party_by_gender.is_empty());
        assert_eq!(views.party_by_gender.total(), 0);
    }

    #[test]
    fn test_custom_labels() {
        let data = Dataset::new(vec![rec("F", "PT", "SUPERIOR COMPLETO")], vec![]);
        let view = data.view();
        let labels = GenderLabels {
            female: "F".to_string(),
            male: "M".to_string(),
        };
        let views = build_views(&view, &labels);
        assert_eq!(views.party_female.get("PT"), Some(1));
        assert_eq!(views.party_by_gender.columns, vec!["F", "M"]);
    }
}
