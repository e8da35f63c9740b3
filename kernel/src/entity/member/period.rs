use error_stack::Report;
use serde::{Deserialize, Serialize};
use time::Date;
use vodca::References;

use crate::KernelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, References)]
pub struct MembershipPeriod {
    joined_on: Date,
    left_on: Option<Date>,
}

impl MembershipPeriod {
    pub fn new(joined_on: Date, left_on: Option<Date>) -> error_stack::Result<Self, KernelError> {
        if let Some(left_on) = left_on {
            if left_on < joined_on {
                return Err(Report::new(KernelError::Validation).attach_printable(format!(
                    "membership cannot end ({left_on}) before it starts ({joined_on})"
                )));
            }
        }
        Ok(Self { joined_on, left_on })
    }

    pub fn is_active_on(&self, date: Date) -> bool {
        self.joined_on <= date && self.left_on.map_or(true, |left_on| date <= left_on)
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;

    use super::MembershipPeriod;

    #[test]
    fn end_before_start_is_rejected() {
        assert!(MembershipPeriod::new(date!(2024 - 02 - 01), Some(date!(2024 - 01 - 31))).is_err());
    }

    #[test]
    fn active_window_is_inclusive() {
        let period =
            MembershipPeriod::new(date!(2024 - 01 - 01), Some(date!(2024 - 12 - 31))).unwrap();
        assert!(!period.is_active_on(date!(2023 - 12 - 31)));
        assert!(period.is_active_on(date!(2024 - 01 - 01)));
        assert!(period.is_active_on(date!(2024 - 12 - 31)));
        assert!(!period.is_active_on(date!(2025 - 01 - 01)));

        let open = MembershipPeriod::new(date!(2024 - 01 - 01), None).unwrap();
        assert!(open.is_active_on(date!(2100 - 01 - 01)));
    }
}
