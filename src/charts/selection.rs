//! Current indicator and region choice.

use crate::data::Indicator;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub indicator: Indicator,
    /// `None` until a table with at least one region is loaded.
    pub region: Option<String>,
}

impl Selection {
    /// Keep the selected region if the new table has it, else pick the first one.
    pub fn reconcile(&mut self, regions: &[String]) {
        let keep = self
            .region
            .as_ref()
            .is_some_and(|current| regions.contains(current));
        if !keep {
            self.region = regions.first().cloned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_ca_and_no_region() {
        let selection = Selection::default();
        assert_eq!(selection.indicator, Indicator::CA);
        assert!(selection.region.is_none());
    }

    #[test]
    fn first_region_is_picked_on_first_load() {
        let mut selection = Selection::default();
        selection.reconcile(&names(&["Oriental", "Souss-Massa"]));
        assert_eq!(selection.region.as_deref(), Some("Oriental"));
    }

    #[test]
    fn existing_region_survives_reload() {
        let mut selection = Selection {
            indicator: Indicator::RA,
            region: Some("Souss-Massa".to_string()),
        };
        selection.reconcile(&names(&["Oriental", "Souss-Massa"]));
        assert_eq!(selection.region.as_deref(), Some("Souss-Massa"));
        assert_eq!(selection.indicator, Indicator::RA);

        selection.reconcile(&names(&["Drâa-Tafilalet"]));
        assert_eq!(selection.region.as_deref(), Some("Drâa-Tafilalet"));

        selection.reconcile(&[]);
        assert!(selection.region.is_none());
    }
}
