//! First-run onboarding stepper
//!
//! Three pages, advanced one at a time; finishing the last page records the
//! completion through the progress ledger. The flag gates the onboarding
//! presentation on future launches and is deliberately not cleared by a
//! progress reset.

use crate::progress::ProgressLedger;

/// Number of onboarding pages
pub const PAGE_COUNT: u8 = 3;

/// Paging state for the onboarding carousel
#[derive(Debug, Clone, Copy, Default)]
pub struct OnboardingFlow {
    page: u8,
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current page, 0-based
    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn is_last_page(&self) -> bool {
        self.page + 1 == PAGE_COUNT
    }

    /// Step to the next page; stops at the last one.
    pub fn advance(&mut self) {
        if !self.is_last_page() {
            self.page += 1;
        }
    }

    /// Finish onboarding from the last page. Earlier pages ignore it, so the
    /// "Let's Begin" action can only fire where the UI shows it.
    pub fn finish(&self, ledger: &mut ProgressLedger) {
        if self.is_last_page() {
            ledger.complete_onboarding();
        }
    }
}
