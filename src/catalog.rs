//! In-memory catalog
//!
//! Backing data for the mock backend and the stub server. Seeded with the
//! demo records the dashboard has always shown.

use crate::models::{Course, HostelAssignment, PayingStudent, Program, RecordId, UploadFile, UploadKind};
use parking_lot::RwLock;
use tracing::debug;

/// A received upload, kept for inspection
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub kind: UploadKind,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Mutable record store
#[derive(Debug)]
pub struct Catalog {
    courses: RwLock<Vec<Course>>,
    programs: RwLock<Vec<Program>>,
    paying_students: RwLock<Vec<PayingStudent>>,
    hostel: RwLock<HostelAssignment>,
    uploads: RwLock<Vec<StoredFile>>,
}

impl Catalog {
    /// Catalog with the demo data
    pub fn seeded() -> Self {
        let course = |name: &str| Course {
            id: RecordId::new(),
            name: name.to_string(),
        };
        let program = |name: &str| Program {
            id: RecordId::new(),
            name: name.to_string(),
        };
        let student = |name: &str| PayingStudent {
            id: RecordId::new(),
            name: name.to_string(),
        };

        Self {
            courses: RwLock::new(vec![
                course("Linear algebra"),
                course("Mathematical analysis"),
                course("Programming fundamentals"),
            ]),
            programs: RwLock::new(vec![program("prog-1"), program("prog-2"), program("prog-3")]),
            paying_students: RwLock::new(vec![student("Petr"), student("Vanya"), student("Ivan")]),
            hostel: RwLock::new(HostelAssignment {
                name: "Dormitory No. 1".to_string(),
                address: "Moscow 1234".to_string(),
                room: "412".to_string(),
                floor: "4".to_string(),
                commander_name: "Alice".to_string(),
            }),
            uploads: RwLock::new(Vec::new()),
        }
    }

    pub fn courses(&self) -> Vec<Course> {
        self.courses.read().clone()
    }

    pub fn add_course(&self, name: &str) -> Course {
        let course = Course {
            id: RecordId::new(),
            name: name.to_string(),
        };
        self.courses.write().push(course.clone());
        debug!("Catalog: added course {}", name);
        course
    }

    pub fn programs(&self) -> Vec<Program> {
        self.programs.read().clone()
    }

    pub fn add_program(&self, name: &str) -> Program {
        let program = Program {
            id: RecordId::new(),
            name: name.to_string(),
        };
        self.programs.write().push(program.clone());
        debug!("Catalog: added program {}", name);
        program
    }

    pub fn paying_students(&self) -> Vec<PayingStudent> {
        self.paying_students.read().clone()
    }

    pub fn hostel(&self) -> HostelAssignment {
        self.hostel.read().clone()
    }

    /// Record an upload; course and program material also becomes a list entry
    /// named after the file
    pub fn store_upload(&self, kind: UploadKind, file: &UploadFile) {
        match kind {
            UploadKind::Course => {
                self.add_course(file.stem());
            }
            UploadKind::Program => {
                self.add_program(file.stem());
            }
            UploadKind::Payment => {}
        }

        self.uploads.write().push(StoredFile {
            kind,
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
            size: file.bytes.len(),
        });
    }

    pub fn uploads(&self) -> Vec<StoredFile> {
        self.uploads.read().clone()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_data() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.courses().len(), 3);
        assert_eq!(catalog.programs().len(), 3);
        assert_eq!(catalog.paying_students().len(), 3);
        assert_eq!(catalog.hostel().room, "412");
    }

    #[test]
    fn test_ids_are_stable_across_reads() {
        let catalog = Catalog::seeded();
        let first = catalog.courses();
        let second = catalog.courses();
        assert_eq!(first, second);
    }

    #[test]
    fn test_course_upload_adds_course() {
        let catalog = Catalog::seeded();
        let file = UploadFile::new("Topology.pdf", "application/pdf", vec![1, 2, 3]);

        catalog.store_upload(UploadKind::Course, &file);

        let courses = catalog.courses();
        assert_eq!(courses.len(), 4);
        assert_eq!(courses[3].name, "Topology");
        assert_eq!(catalog.uploads()[0].size, 3);
    }

    #[test]
    fn test_payment_upload_leaves_lists_alone() {
        let catalog = Catalog::seeded();
        let file = UploadFile::new("receipt.png", "image/png", vec![0]);

        catalog.store_upload(UploadKind::Payment, &file);

        assert_eq!(catalog.courses().len(), 3);
        assert_eq!(catalog.programs().len(), 3);
        assert_eq!(catalog.uploads().len(), 1);
        assert_eq!(catalog.uploads()[0].kind, UploadKind::Payment);
    }
}
