// src/services/student_service.rs

use crate::{common::error::AppError, db::StudentRepository, models::school::Student};

#[derive(Clone)]
pub struct StudentService {
    student_repo: StudentRepository,
}

impl StudentService {
    pub fn new(student_repo: StudentRepository) -> Self {
        Self { student_repo }
    }

    // Cria o aluno com um código de barras alocado de forma monotônica:
    // STUD + contador de seis dígitos, sempre o maior já emitido + 1.
    pub async fn create_with_barcode(
        &self,
        name: &str,
        parent_phone: Option<&str>,
        parent_email: Option<&str>,
        class_id: Option<i64>,
    ) -> Result<Student, AppError> {
        let next = self.student_repo.max_barcode_suffix().await? + 1;
        let barcode = format_barcode(next);

        self.student_repo
            .create(name, &barcode, parent_phone, parent_email, class_id)
            .await
    }

    pub async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Student>, AppError> {
        if !is_valid_barcode(barcode) {
            return Ok(None);
        }
        self.student_repo.find_by_barcode(barcode).await
    }
}

pub fn format_barcode(suffix: i64) -> String {
    format!("STUD{suffix:06}")
}

// STUD seguido de exatamente seis dígitos
pub fn is_valid_barcode(barcode: &str) -> bool {
    let Some(rest) = barcode.strip_prefix("STUD") else {
        return false;
    };
    rest.len() == 6 && rest.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codigo_tem_seis_digitos_com_zeros_a_esquerda() {
        assert_eq!(format_barcode(1), "STUD000001");
        assert_eq!(format_barcode(42), "STUD000042");
        assert_eq!(format_barcode(123456), "STUD123456");
    }

    #[test]
    fn validacao_do_formato() {
        assert!(is_valid_barcode("STUD000042"));
        assert!(!is_valid_barcode("STUD42"));
        assert!(!is_valid_barcode("stud000042"));
        assert!(!is_valid_barcode("STUD00004X"));
        assert!(!is_valid_barcode(""));
    }
}
