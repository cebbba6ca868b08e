use crate::models::Element;

/// One rename request of a renumbering plan.
///
/// Steps address elements by index into the aspect's current element list,
/// never by reference: the list is re-derived on every parse and indices are
/// the only stable coordinates during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Rename through the rename service: declaration plus every reference.
    Service { index: usize, new_name: String },
    /// Replace the element's name token directly, and obtain the reference
    /// cascade by renaming the element at `cascade_via` through the service,
    /// with that element's declaration range excluded from the result.
    ///
    /// Used when the element's name collides with the modified element's: the
    /// service resolves references by name, so invoking it on the modified
    /// element rewrites the references that belong to the displaced one.
    SpanWithCascade {
        index: usize,
        cascade_via: usize,
        new_name: String,
    },
    /// Replace the element's name token directly, no reference cascade.
    Span { index: usize, new_name: String },
}

/// Computes the rename requests that restore `prefix + position` for every
/// element from `pivot` to the end of the aspect.
///
/// `pivot` is the index of the first element past the edit offset; it clamps
/// to the element count. Deletions walk upward from the pivot so each element
/// closes the gap left by its predecessor; insertions walk downward from the
/// end so no two live elements ever hold the same name mid-plan.
pub fn plan_tail(
    elements: &[Element],
    prefix: &str,
    pivot: usize,
    is_deletion: bool,
) -> Vec<PlanStep> {
    let pivot = pivot.min(elements.len());
    let Some(last) = elements.last() else {
        return Vec::new();
    };
    // renaming is only needed when the tail is out of sync
    if last.name == compose(prefix, elements.len()) {
        return Vec::new();
    }

    let modified = pivot.checked_sub(1);
    let mut steps = Vec::new();

    if is_deletion {
        for i in pivot..elements.len() {
            steps.push(PlanStep::Service {
                index: i,
                new_name: compose(prefix, i + 1),
            });
        }
    } else {
        for i in (pivot..elements.len()).rev() {
            let new_name = compose(prefix, i + 1);
            match modified {
                Some(m) if elements[i].name == elements[m].name => {
                    steps.push(PlanStep::SpanWithCascade {
                        index: i,
                        cascade_via: m,
                        new_name,
                    });
                }
                _ => steps.push(PlanStep::Service { index: i, new_name }),
            }
        }
    }

    steps
}

/// Computes the step fixing the modified element itself, when it exists and
/// its name does not match its position. Its references need no rewrite; they
/// already carry the name the element is being restored to.
pub fn plan_modified(elements: &[Element], prefix: &str, pivot: usize) -> Option<PlanStep> {
    let index = pivot.checked_sub(1)?;
    let element = elements.get(index)?;
    let want = compose(prefix, pivot);
    (element.name != want).then(|| PlanStep::Span {
        index,
        new_name: want,
    })
}

fn compose(prefix: &str, position: usize) -> String {
    format!("{prefix}{position}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::rope::Span;
    use rstest::rstest;

    fn elements(names: &[&str]) -> Vec<Element> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Element {
                name: name.to_string(),
                name_span: Span::new(i * 20, i * 20 + name.len()),
                offset: i * 20,
            })
            .collect()
    }

    #[test]
    fn consistent_aspect_needs_no_plan() {
        let els = elements(&["H1", "H2", "H3"]);
        assert!(plan_tail(&els, "H", 1, false).is_empty());
        assert!(plan_tail(&els, "H", 1, true).is_empty());
        assert_eq!(plan_modified(&els, "H", 2), None);
    }

    #[test]
    fn deletion_walks_upward_from_the_pivot() {
        // H2 deleted: survivors are H1, H3, H4 and the pivot is index 1
        let els = elements(&["H1", "H3", "H4"]);
        let steps = plan_tail(&els, "H", 1, true);
        assert_eq!(
            steps,
            vec![
                PlanStep::Service {
                    index: 1,
                    new_name: "H2".to_string()
                },
                PlanStep::Service {
                    index: 2,
                    new_name: "H3".to_string()
                },
            ]
        );
    }

    #[test]
    fn insertion_walks_downward_and_special_cases_the_collision() {
        // fresh hazard typed between H1 and H2, parsed with the colliding
        // name H2; the displaced old H2 sits at index 2
        let els = elements(&["H1", "H2", "H2", "H3"]);
        let steps = plan_tail(&els, "H", 2, false);
        assert_eq!(
            steps,
            vec![
                PlanStep::Service {
                    index: 3,
                    new_name: "H4".to_string()
                },
                PlanStep::SpanWithCascade {
                    index: 2,
                    cascade_via: 1,
                    new_name: "H3".to_string()
                },
            ]
        );
    }

    #[test]
    fn modified_element_gets_a_direct_fix() {
        let els = elements(&["H1", "Hx", "H3"]);
        assert_eq!(
            plan_modified(&els, "H", 2),
            Some(PlanStep::Span {
                index: 1,
                new_name: "H2".to_string()
            })
        );
    }

    #[test]
    fn pivot_zero_has_no_modified_element() {
        let els = elements(&["H2", "H3"]);
        assert_eq!(plan_modified(&els, "H", 0), None);
        // with no modified element, every tail rename goes through the service
        let steps = plan_tail(&els, "H", 0, false);
        assert!(steps.iter().all(|s| matches!(s, PlanStep::Service { .. })));
        assert_eq!(steps.len(), 2);
    }

    #[rstest]
    #[case(5, true)]
    #[case(17, false)]
    fn out_of_range_pivot_clamps(#[case] pivot: usize, #[case] is_deletion: bool) {
        let els = elements(&["H1", "H3"]);
        let steps = plan_tail(&els, "H", pivot, is_deletion);
        // clamped to len: nothing below the pivot, so no tail steps
        assert!(steps.is_empty());
    }

    #[test]
    fn empty_aspect_plans_nothing() {
        assert!(plan_tail(&[], "H", 0, true).is_empty());
        assert!(plan_tail(&[], "H", 0, false).is_empty());
        assert_eq!(plan_modified(&[], "H", 0), None);
    }

    #[test]
    fn deletion_of_the_last_element_leaves_survivors_alone() {
        // H3 of H1..H3 deleted: pivot past the end, tail empty, and the
        // remaining names already match their positions
        let els = elements(&["H1", "H2"]);
        assert!(plan_tail(&els, "H", 2, true).is_empty());
        assert_eq!(plan_modified(&els, "H", 2), None);
    }
}
