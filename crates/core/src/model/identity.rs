use serde::{Deserialize, Serialize};

use crate::model::ids::{AssignmentId, ClassId, StudentId};

/// Who is practicing, threaded explicitly into session starts and lifecycle
/// hooks.
///
/// Any of the three ids may be absent: anonymous kiosk practice has none,
/// free practice has a student and class but no assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeIdentity {
    pub student_id: Option<StudentId>,
    pub class_id: Option<ClassId>,
    pub assignment_id: Option<AssignmentId>,
}

impl PracticeIdentity {
    /// Identity with no student, class, or assignment attached.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Identity for a logged-in student without an assignment.
    #[must_use]
    pub fn student(student_id: StudentId, class_id: Option<ClassId>) -> Self {
        Self {
            student_id: Some(student_id),
            class_id,
            assignment_id: None,
        }
    }

    /// Attach an assignment to this identity.
    #[must_use]
    pub fn with_assignment(mut self, assignment_id: AssignmentId) -> Self {
        self.assignment_id = Some(assignment_id);
        self
    }

    /// Returns the assignment/student pair when both are present.
    ///
    /// Assignment submission tracking requires both ids; everything else is
    /// recorded without them.
    #[must_use]
    pub fn assignment_pair(&self) -> Option<(&AssignmentId, &StudentId)> {
        match (&self.assignment_id, &self.student_id) {
            (Some(assignment), Some(student)) => Some((assignment, student)),
            _ => None,
        }
    }
}
