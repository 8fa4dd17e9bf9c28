//! Per-system roll-up of recorded results.

use crate::results::model::{SystemResults, SystemSummary, TestResult, Verdict};

/// Count PASS and FAIL results per known system.
///
/// Every name in `systems` appears in the output, with zeros when nothing
/// matched. Results naming a system outside `systems` and `Unset` results are
/// not counted. The output depends only on the multiset of inputs.
pub fn summarize<'a, R, S>(results: R, systems: S) -> SystemResults
where
    R: IntoIterator<Item = &'a TestResult>,
    S: IntoIterator,
    S::Item: AsRef<str>,
{
    let mut summaries: SystemResults = systems
        .into_iter()
        .map(|name| {
            let name = name.as_ref().to_string();
            (name.clone(), SystemSummary::empty(name))
        })
        .collect();

    for result in results {
        let Some(summary) = summaries.get_mut(&result.system) else {
            continue;
        };
        match result.result {
            Verdict::Pass => summary.pass += 1,
            Verdict::Fail => summary.fail += 1,
            Verdict::Unset => continue,
        }
        summary.total = summary.pass + summary.fail;
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use proptest::prelude::*;

    fn all_pass_except(fail_id: u32, reason: &str) -> Vec<TestResult> {
        catalog::test_items()
            .iter()
            .map(|item| {
                if item.id == fail_id {
                    TestResult::from_item(item, Verdict::Fail, reason)
                } else {
                    TestResult::from_item(item, Verdict::Pass, "")
                }
            })
            .collect()
    }

    #[test]
    fn door_failure_lands_in_door_system_only() {
        let results = all_pass_except(21, "relay stuck");
        let summary = summarize(&results, catalog::system_names());

        let door = &summary["Door System"];
        assert_eq!((door.pass, door.fail, door.total), (0, 1, 1));
        for (system, s) in &summary {
            if system != "Door System" {
                assert_eq!(s.fail, 0, "{system} should have no failures");
                assert_eq!(s.total, s.pass);
            }
        }
    }

    #[test]
    fn systems_without_results_report_zero() {
        let summary = summarize(std::iter::empty::<&TestResult>(), catalog::system_names());
        assert_eq!(summary.len(), catalog::SYSTEMS.len());
        assert!(summary.values().all(|s| s.total == 0 && s.pass == 0));
    }

    #[test]
    fn unknown_systems_and_unset_results_are_ignored() {
        let item = catalog::find_item(1).unwrap();
        let mut stray = TestResult::from_item(item, Verdict::Fail, "");
        stray.system = "Pantograph".to_string();
        let unset = TestResult::from_item(item, Verdict::Unset, "");
        let summary = summarize([&stray, &unset], catalog::system_names());
        assert!(!summary.contains_key("Pantograph"));
        assert_eq!(summary["Train System"].total, 0);
    }

    #[test]
    fn totals_match_result_counts_per_system() {
        let results = all_pass_except(14, "no brake release");
        let summary = summarize(&results, catalog::system_names());
        for (system, s) in &summary {
            let expected = results.iter().filter(|r| &r.system == system).count();
            assert_eq!(s.total as usize, expected);
            assert_eq!(s.total, s.pass + s.fail);
        }
    }

    fn arb_results() -> impl Strategy<Value = Vec<TestResult>> {
        let items = catalog::test_items();
        prop::collection::vec(
            (
                0..items.len(),
                prop_oneof![
                    Just(Verdict::Pass),
                    Just(Verdict::Fail),
                    Just(Verdict::Unset)
                ],
            ),
            0..40,
        )
        .prop_map(move |picks| {
            picks
                .into_iter()
                .map(|(idx, verdict)| TestResult::from_item(&items[idx], verdict, ""))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn summary_is_order_independent(
            (results, shuffled) in arb_results().prop_flat_map(|r| {
                let shuffled = Just(r.clone()).prop_shuffle();
                (Just(r), shuffled)
            })
        ) {
            let a = summarize(&results, catalog::system_names());
            let b = summarize(&shuffled, catalog::system_names());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn summary_is_idempotent(results in arb_results()) {
            let first = summarize(&results, catalog::system_names());
            let second = summarize(&results, catalog::system_names());
            prop_assert_eq!(&first, &second);
            for s in first.values() {
                prop_assert_eq!(s.total, s.pass + s.fail);
            }
        }
    }
}
