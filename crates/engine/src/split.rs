//! Share computation for a single expense.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{CustomShareInput, EngineError, MoneyCents, ResultEngine, SplitType};

/// A share about to be written: debtor, amount owed and the custom override
/// it came from, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareDraft {
    pub user_id: Uuid,
    pub amount: MoneyCents,
    pub custom_amount: Option<MoneyCents>,
}

/// Computes the shares of an expense, one per debtor, in debtor order.
///
/// With [`SplitType::Equal`] every debtor owes `total / N` rounded half-up to
/// the cent. With [`SplitType::Custom`] a debtor listed in `custom` owes that
/// amount verbatim, the others owe the equal amount computed over all `N`
/// debtors. Rounding residuals are never redistributed, so the shares may not
/// add up to `total`.
///
/// Custom amounts are ignored for an equal split.
pub fn compute_shares(
    total: MoneyCents,
    split_type: SplitType,
    debtors: &[Uuid],
    custom: &[CustomShareInput],
) -> ResultEngine<Vec<ShareDraft>> {
    if debtors.is_empty() {
        return Err(EngineError::InvalidSplit(
            "at least one debtor is required".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(debtors.len());
    for debtor in debtors {
        if !seen.insert(*debtor) {
            return Err(EngineError::InvalidReference(format!(
                "debtor {debtor} listed more than once"
            )));
        }
    }

    let overrides = match split_type {
        SplitType::Equal => HashMap::new(),
        SplitType::Custom => custom_overrides(&seen, custom)?,
    };

    let equal = total.split_evenly(debtors.len());
    Ok(debtors
        .iter()
        .map(|user_id| match overrides.get(user_id) {
            Some(amount) => ShareDraft {
                user_id: *user_id,
                amount: *amount,
                custom_amount: Some(*amount),
            },
            None => ShareDraft {
                user_id: *user_id,
                amount: equal,
                custom_amount: None,
            },
        })
        .collect())
}

fn custom_overrides(
    debtors: &HashSet<Uuid>,
    custom: &[CustomShareInput],
) -> ResultEngine<HashMap<Uuid, MoneyCents>> {
    let mut overrides = HashMap::with_capacity(custom.len());
    for entry in custom {
        if entry.amount.is_negative() {
            return Err(EngineError::InvalidSplit(format!(
                "custom amount for {} must not be negative",
                entry.user_id
            )));
        }
        if !debtors.contains(&entry.user_id) {
            return Err(EngineError::InvalidSplit(format!(
                "custom amount given for {} who is not a debtor",
                entry.user_id
            )));
        }
        if overrides.insert(entry.user_id, entry.amount).is_some() {
            return Err(EngineError::InvalidSplit(format!(
                "custom amount for {} given more than once",
                entry.user_id
            )));
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn equal_split_rounds_each_share_half_up() {
        let debtors = ids(3);
        let shares = compute_shares(MoneyCents::new(100_00), SplitType::Equal, &debtors, &[]).unwrap();

        assert_eq!(shares.len(), 3);
        for (share, debtor) in shares.iter().zip(&debtors) {
            assert_eq!(share.user_id, *debtor);
            assert_eq!(share.amount, MoneyCents::new(33_33));
            assert_eq!(share.custom_amount, None);
        }
    }

    #[test]
    fn equal_split_does_not_redistribute_residual() {
        let debtors = ids(6);
        let shares = compute_shares(MoneyCents::new(100_00), SplitType::Equal, &debtors, &[]).unwrap();

        let total: MoneyCents = shares.iter().map(|s| s.amount).sum();
        assert!(shares.iter().all(|s| s.amount == MoneyCents::new(16_67)));
        assert_eq!(total, MoneyCents::new(100_02));
    }

    #[test]
    fn custom_split_falls_back_on_full_debtor_count() {
        let debtors = ids(3);
        let custom = [CustomShareInput {
            user_id: debtors[1],
            amount: MoneyCents::new(50_00),
        }];
        let shares =
            compute_shares(MoneyCents::new(90_00), SplitType::Custom, &debtors, &custom).unwrap();

        assert_eq!(shares[0].amount, MoneyCents::new(30_00));
        assert_eq!(shares[0].custom_amount, None);
        assert_eq!(shares[1].amount, MoneyCents::new(50_00));
        assert_eq!(shares[1].custom_amount, Some(MoneyCents::new(50_00)));
        assert_eq!(shares[2].amount, MoneyCents::new(30_00));
    }

    #[test]
    fn equal_split_ignores_custom_amounts() {
        let debtors = ids(2);
        let custom = [CustomShareInput {
            user_id: debtors[0],
            amount: MoneyCents::new(1_00),
        }];
        let shares =
            compute_shares(MoneyCents::new(10_00), SplitType::Equal, &debtors, &custom).unwrap();

        assert!(shares.iter().all(|s| s.amount == MoneyCents::new(5_00)));
    }

    #[test]
    fn rejects_bad_debtor_lists() {
        let err = compute_shares(MoneyCents::new(10_00), SplitType::Equal, &[], &[]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSplit(_)));

        let id = Uuid::new_v4();
        let err =
            compute_shares(MoneyCents::new(10_00), SplitType::Equal, &[id, id], &[]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidReference(_)));
    }

    #[test]
    fn rejects_bad_custom_amounts() {
        let debtors = ids(2);
        let stranger = CustomShareInput {
            user_id: Uuid::new_v4(),
            amount: MoneyCents::new(1_00),
        };
        let err = compute_shares(MoneyCents::new(10_00), SplitType::Custom, &debtors, &[stranger])
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSplit(_)));

        let negative = CustomShareInput {
            user_id: debtors[0],
            amount: MoneyCents::new(-1),
        };
        let err = compute_shares(MoneyCents::new(10_00), SplitType::Custom, &debtors, &[negative])
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSplit(_)));
    }
}
