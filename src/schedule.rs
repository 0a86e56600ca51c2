use tokio::sync::mpsc;

use crate::error::ScheduleError;
use crate::models::CompatibilityMatch;

/// Receives the pair an operator picked. Fire-and-forget: implementations own
/// any retry or failure reporting.
pub trait SessionScheduler {
    fn schedule_session(&self, student1_id: &str, student2_id: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub student1_id: String,
    pub student2_id: String,
}

/// Forwards requests to whoever holds the receiving end, typically the store.
#[derive(Debug, Clone)]
pub struct ChannelScheduler {
    sender: mpsc::UnboundedSender<ScheduleRequest>,
}

impl ChannelScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ScheduleRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SessionScheduler for ChannelScheduler {
    fn schedule_session(&self, student1_id: &str, student2_id: &str) {
        let request = ScheduleRequest {
            student1_id: student1_id.to_string(),
            student2_id: student2_id.to_string(),
        };
        if self.sender.send(request).is_err() {
            tracing::warn!(student1_id, student2_id, "schedule receiver closed, request dropped");
        }
    }
}

/// Finds the pair in the tournament and hands it to the scheduler.
pub fn schedule_pair<'a, S: SessionScheduler + ?Sized>(
    matches: &'a [CompatibilityMatch],
    student1_id: &str,
    student2_id: &str,
    scheduler: &S,
) -> Result<&'a CompatibilityMatch, ScheduleError> {
    if student1_id == student2_id {
        return Err(ScheduleError::SamePair(student1_id.to_string()));
    }

    let candidate = matches
        .iter()
        .find(|candidate| candidate.pairs(student1_id, student2_id))
        .ok_or_else(|| {
            ScheduleError::PairNotFound(student1_id.to_string(), student2_id.to_string())
        })?;

    tracing::info!(
        student1_id = %candidate.student1.id,
        student2_id = %candidate.student2.id,
        score = candidate.compatibility_score,
        recommendation = %candidate.recommendation,
        "scheduling sparring session"
    );
    scheduler.schedule_session(&candidate.student1.id, &candidate.student2.id);
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, StudentRecord};
    use crate::tournament;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, String)>>,
    }

    impl SessionScheduler for Recorder {
        fn schedule_session(&self, student1_id: &str, student2_id: &str) {
            self.calls
                .borrow_mut()
                .push((student1_id.to_string(), student2_id.to_string()));
        }
    }

    fn roster() -> Vec<StudentRecord> {
        ["ana", "juan", "lucia"]
            .into_iter()
            .map(|id| StudentRecord {
                id: id.to_string(),
                first_name: id.to_string(),
                last_name: "Test".to_string(),
                height_cm: 170.0,
                weight_kg: 70.0,
                age: 25,
                level: Level::Advanced,
                strengths: Vec::new(),
                weaknesses: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn schedules_pair_in_either_order() {
        let matches = tournament::generate(&roster(), &[]);
        let recorder = Recorder::default();

        let picked = schedule_pair(&matches, "lucia", "ana", &recorder).unwrap();
        assert!(picked.pairs("ana", "lucia"));
        assert_eq!(
            recorder.calls.borrow().as_slice(),
            &[("ana".to_string(), "lucia".to_string())]
        );
    }

    #[test]
    fn unknown_pair_is_rejected_without_scheduling() {
        let matches = tournament::generate(&roster(), &[]);
        let recorder = Recorder::default();

        let err = schedule_pair(&matches, "ana", "nobody", &recorder).unwrap_err();
        assert!(matches!(err, ScheduleError::PairNotFound(_, _)));
        let err = schedule_pair(&matches, "ana", "ana", &recorder).unwrap_err();
        assert!(matches!(err, ScheduleError::SamePair(_)));
        assert!(recorder.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn channel_scheduler_forwards_requests() {
        let (scheduler, mut receiver) = ChannelScheduler::new();
        scheduler.schedule_session("ana", "juan");
        drop(scheduler);

        assert_eq!(
            receiver.recv().await,
            Some(ScheduleRequest {
                student1_id: "ana".to_string(),
                student2_id: "juan".to_string(),
            })
        );
        assert_eq!(receiver.recv().await, None);
    }

    #[test]
    fn closed_channel_does_not_panic() {
        let (scheduler, receiver) = ChannelScheduler::new();
        drop(receiver);
        scheduler.schedule_session("ana", "juan");
    }
}
