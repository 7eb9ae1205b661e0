use super::domain::{ApplicationStatus, CandidateRecord, JobRole};

/// Admin list filters. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    pub status: Option<ApplicationStatus>,
    pub job_role: Option<JobRole>,
    pub search: Option<String>,
}

impl CandidateFilter {
    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_job_role(mut self, job_role: JobRole) -> Self {
        self.job_role = Some(job_role);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Search text matches name, job role or country, ignoring case.
    pub fn matches(&self, record: &CandidateRecord) -> bool {
        if self.status.is_some_and(|status| status != record.status) {
            return false;
        }
        if self
            .job_role
            .as_ref()
            .is_some_and(|role| *role != record.job_role)
        {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                [
                    record.name.as_str(),
                    record.job_role.label(),
                    record.country.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::priority::test_support::candidate;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(CandidateFilter::default().matches(&candidate("Ada", 30)));
    }

    #[test]
    fn status_and_role_must_both_match() {
        let record = candidate("Ada", 30);
        let filter = CandidateFilter::default()
            .with_status(ApplicationStatus::Pending)
            .with_job_role(JobRole::DataScientist);
        assert!(filter.matches(&record));

        let filter = filter.with_status(ApplicationStatus::Approved);
        assert!(!filter.matches(&record));
    }

    #[test]
    fn search_covers_name_role_and_country() {
        let record = candidate("Ada Lovelace", 30);
        for needle in ["love", "SCIENTIST", "canada", "  ada "] {
            assert!(
                CandidateFilter::default().with_search(needle).matches(&record),
                "{needle} should match"
            );
        }
        assert!(!CandidateFilter::default().with_search("kenya").matches(&record));
    }
}
