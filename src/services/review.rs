//! Biomedical review of completed maintenance

use std::str::FromStr;

use super::{best_effort::best_effort, Backend, SESSION_EXPIRED};
use crate::{
    error::{AppError, AppResult},
    models::{CompletionStatus, LogStatus, PendingReview, Profile, ReviewRequest},
    notify::Notice,
};

pub const APPROVED: &str = "Maintenance approved and marked as completed.";
pub const RETURNED: &str = "Maintenance requires additional work. Returned to technician queue.";
pub const REVIEW_FIELDS_REQUIRED: &str = "Please fill all required fields.";
pub const REVIEW_FAILED: &str = "Failed to complete review.";
pub const NOT_AUTHORIZED: &str = "Only biomedical engineers and admins can review maintenance.";

/// Number of pending reviews shown before "view all"
pub const PREVIEW_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approved,
    RequiresFollowUp,
    Rejected,
}

impl ReviewDecision {
    pub fn completion_status(&self) -> CompletionStatus {
        match self {
            ReviewDecision::Approved => CompletionStatus::Approved,
            ReviewDecision::RequiresFollowUp => CompletionStatus::RequiresFollowUp,
            ReviewDecision::Rejected => CompletionStatus::Rejected,
        }
    }

    /// Approved work is closed; anything else goes back to the technician queue
    pub fn final_status(&self) -> LogStatus {
        match self {
            ReviewDecision::Approved => LogStatus::Completed,
            ReviewDecision::RequiresFollowUp | ReviewDecision::Rejected => LogStatus::Scheduled,
        }
    }

    pub fn outcome_message(&self) -> &'static str {
        match self {
            ReviewDecision::Approved => APPROVED,
            _ => RETURNED,
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "approved" => Ok(ReviewDecision::Approved),
            "requiresfollowup" => Ok(ReviewDecision::RequiresFollowUp),
            "rejected" => Ok(ReviewDecision::Rejected),
            _ => Err(format!("Invalid review decision: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    pub service_rating: Option<u8>,
    pub decision: Option<ReviewDecision>,
}

impl ReviewDraft {
    /// The request body together with the decision it encodes
    pub fn to_request(&self) -> AppResult<(ReviewRequest, ReviewDecision)> {
        match (self.service_rating, self.decision) {
            (Some(rating @ 1..=5), Some(decision)) => Ok((
                ReviewRequest {
                    service_rating: rating,
                    completion_status: decision.completion_status(),
                    status: decision.final_status(),
                },
                decision,
            )),
            _ => Err(AppError::Validation(REVIEW_FIELDS_REQUIRED.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Idle,
    Reviewing { review: PendingReview, draft: ReviewDraft },
    Submitting { maintenance_id: String },
    Succeeded { maintenance_id: String, decision: ReviewDecision },
    Failed { review: PendingReview, draft: ReviewDraft, message: String },
}

pub struct ReviewFlow {
    backend: Backend,
    state: ReviewState,
}

impl ReviewFlow {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: ReviewState::Idle,
        }
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ReviewState::Reviewing { .. } | ReviewState::Failed { .. })
    }

    /// Open the review composer; only authorized roles may review
    pub fn open(&mut self, profile: &Profile, review: PendingReview) -> AppResult<()> {
        if !profile.is_authorized() {
            self.backend.notify(Notice::error(NOT_AUTHORIZED));
            return Err(AppError::Authorization(NOT_AUTHORIZED.to_string()));
        }
        self.state = ReviewState::Reviewing {
            review,
            draft: ReviewDraft::default(),
        };
        Ok(())
    }

    pub fn draft_mut(&mut self) -> Option<&mut ReviewDraft> {
        match &mut self.state {
            ReviewState::Reviewing { draft, .. } | ReviewState::Failed { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = ReviewState::Idle;
    }

    pub async fn submit(&mut self) -> AppResult<ReviewDecision> {
        let (review, draft) = match &self.state {
            ReviewState::Reviewing { review, draft } | ReviewState::Failed { review, draft, .. } => {
                (review.clone(), draft.clone())
            }
            _ => return Err(AppError::Validation("No review is open".to_string())),
        };

        let (request, decision) = match draft.to_request() {
            Ok(parts) => parts,
            Err(e) => {
                self.backend.notify(Notice::warning(REVIEW_FIELDS_REQUIRED));
                return Err(e);
            }
        };

        let maintenance_id = review.maintenance_id.clone();
        self.state = ReviewState::Submitting {
            maintenance_id: maintenance_id.clone(),
        };
        tracing::info!(
            maintenance_id = %maintenance_id,
            decision = %request.completion_status,
            final_status = %request.status,
            "Submitting review"
        );

        match self.backend.api.review_completion(&maintenance_id, &request).await {
            Ok(_) => {
                let notice = match decision {
                    ReviewDecision::Approved => Notice::success(decision.outcome_message()),
                    _ => Notice::warning(decision.outcome_message()),
                };
                self.backend.notify(notice);
                self.state = ReviewState::Succeeded {
                    maintenance_id,
                    decision,
                };
                Ok(decision)
            }
            Err(e) if e.is_session_failure() => {
                self.backend.notify(Notice::error(SESSION_EXPIRED));
                self.backend.terminate_session(SESSION_EXPIRED);
                self.state = ReviewState::Idle;
                Err(e)
            }
            Err(e) => {
                let message = e
                    .detail()
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| REVIEW_FAILED.to_string());
                tracing::warn!(maintenance_id = %maintenance_id, error = %e, "Review failed");
                self.backend.notify(Notice::error(message.clone()));
                self.state = ReviewState::Failed {
                    review,
                    draft,
                    message,
                };
                Err(e)
            }
        }
    }
}

/// Logs waiting for biomedical review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingReviews {
    pub reviews: Vec<PendingReview>,
}

impl PendingReviews {
    pub fn count(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn preview(&self) -> &[PendingReview] {
        &self.reviews[..self.reviews.len().min(PREVIEW_LEN)]
    }

    /// Reviews hidden behind "view all"
    pub fn overflow(&self) -> usize {
        self.reviews.len().saturating_sub(PREVIEW_LEN)
    }

    pub fn find(&self, maintenance_id: &str) -> Option<&PendingReview> {
        self.reviews
            .iter()
            .find(|r| r.maintenance_id == maintenance_id)
    }
}

#[derive(Clone)]
pub struct PendingReviewService {
    backend: Backend,
}

impl PendingReviewService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Empty for roles that cannot review, or when the call fails
    pub async fn load(&self, profile: &Profile) -> PendingReviews {
        if !profile.is_authorized() {
            return PendingReviews::default();
        }
        let reviews = best_effort("pending_reviews", self.backend.api.pending_reviews())
            .await
            .unwrap_or_default();
        PendingReviews { reviews }
    }
}
