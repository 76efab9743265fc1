// src/whatsapp/templates.rs
//
// Monta o plano de envio do relatório de uma aula: para cada aluno do roster
// decide qual das três mensagens ele gera (ausência, desempenho ou
// confirmação de presença) e o corpo final. Função pura: o despacho de
// verdade fica no NotificationService.

use chrono::{DateTime, Utc};

use crate::models::attendance::AttendanceStatus;
use crate::models::report::HomeworkStatus;
use crate::models::whatsapp::{MessageType, SessionRosterEntry};

// Uma mensagem pronta para despachar (telefone ainda cru, a normalização
// acontece no gateway na hora do envio).
#[derive(Debug, Clone)]
pub struct PlannedMessage {
    pub student_id: i64,
    pub student_name: String,
    pub phone: String,
    pub kind: MessageType,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct SessionPlan {
    pub messages: Vec<PlannedMessage>,
    // Alunos sem telefone utilizável: nenhum envio, fora dos totais
    pub skipped: u32,
}

// Classifica o roster inteiro.
//
// Regras, na ordem:
//   - sem telefone do responsável        -> pulado;
//   - sem presença registrada ou ausente -> aviso de ausência;
//   - compareceu e tem relatório         -> relatório de desempenho;
//   - compareceu sem relatório           -> confirmação de presença.
pub fn plan_session_messages(
    class_name: &str,
    session_date: DateTime<Utc>,
    roster: &[SessionRosterEntry],
) -> SessionPlan {
    let mut plan = SessionPlan::default();

    for entry in roster {
        let phone = match entry.parent_phone.as_deref() {
            Some(p) if !p.trim().is_empty() => p.to_string(),
            _ => {
                tracing::warn!(
                    "📵 Aluno '{}' sem telefone do responsável, pulando envio",
                    entry.student_name
                );
                plan.skipped += 1;
                continue;
            }
        };

        let kind = classify(entry);
        let body = match kind {
            MessageType::Absence => absence_body(entry, class_name, session_date),
            MessageType::Performance => performance_body(entry, class_name, session_date),
            _ => confirmation_body(entry, class_name, session_date),
        };

        plan.messages.push(PlannedMessage {
            student_id: entry.student_id,
            student_name: entry.student_name.clone(),
            phone,
            kind,
            body,
        });
    }

    plan
}

fn absence_body(entry: &SessionRosterEntry, class_name: &str, date: DateTime<Utc>) -> String {
    format!(
        "⚠️ *Aviso de ausência*\n\n\
         O(a) aluno(a) *{}* não compareceu à aula da turma {} em {}.\n\
         Em caso de dúvida, entre em contato com a coordenação.",
        entry.student_name,
        class_name,
        date.format("%d/%m/%Y"),
    )
}

fn confirmation_body(entry: &SessionRosterEntry, class_name: &str, date: DateTime<Utc>) -> String {
    format!(
        "✅ *Presença confirmada*\n\n\
         O(a) aluno(a) *{}* esteve presente na aula da turma {} em {}.",
        entry.student_name,
        class_name,
        date.format("%d/%m/%Y"),
    )
}

fn performance_body(entry: &SessionRosterEntry, class_name: &str, date: DateTime<Utc>) -> String {
    let mut body = format!(
        "📊 *Relatório da aula*\n\n\
         Aluno(a): *{}*\nTurma: {}\nData: {}\n\n\
         Avaliação do professor: {}\nParticipação: {}\n",
        entry.student_name,
        class_name,
        date.format("%d/%m/%Y"),
        stars(entry.teacher_rating.unwrap_or(0)),
        stars(entry.participation.unwrap_or(0)),
    );

    if let Some(score) = entry.quiz_score {
        body.push_str(&format!("Nota do quiz: {score}/100\n"));
    }
    if let Some(behavior) = entry.behavior.as_deref() {
        body.push_str(&format!("Comportamento: {behavior}\n"));
    }
    if let Some(homework) = entry.homework {
        let label = match homework {
            HomeworkStatus::Completed => "feita",
            HomeworkStatus::Incomplete => "não feita",
            HomeworkStatus::Partial => "parcial",
        };
        body.push_str(&format!("Tarefa de casa: {label}\n"));
    }
    if let Some(comments) = entry.comments.as_deref() {
        if !comments.is_empty() {
            body.push_str(&format!("\nObservações: {comments}\n"));
        }
    }

    body
}

// "4" vira "★★★★☆ (4/5)"
fn stars(rating: i32) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{} ({rating}/5)", "★".repeat(filled), "☆".repeat(5 - filled))
}

// Quem não teve presença marcada é tratado como ausente.
pub fn classify(entry: &SessionRosterEntry) -> MessageType {
    let attended = entry
        .attendance_status
        .map(AttendanceStatus::counts_as_attended)
        .unwrap_or(false);
    if !attended {
        MessageType::Absence
    } else if entry.has_report() {
        MessageType::Performance
    } else {
        MessageType::Confirmation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(
        id: i64,
        name: &str,
        phone: Option<&str>,
        attendance: Option<AttendanceStatus>,
        report: bool,
    ) -> SessionRosterEntry {
        SessionRosterEntry {
            student_id: id,
            student_name: name.to_string(),
            parent_phone: phone.map(str::to_string),
            attendance_status: attendance,
            report_id: report.then_some(77),
            teacher_rating: report.then_some(5),
            quiz_score: report.then_some(90),
            participation: report.then_some(4),
            behavior: report.then_some("exemplar".to_string()),
            homework: report.then_some(HomeworkStatus::Completed),
            comments: None,
        }
    }

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 16, 0, 0).unwrap()
    }

    #[test]
    fn matriz_de_classificacao() {
        use AttendanceStatus::*;

        // ausente ou sem registro -> ausência
        assert_eq!(classify(&entry(1, "A", None, Some(Absent), false)), MessageType::Absence);
        assert_eq!(classify(&entry(2, "B", None, None, false)), MessageType::Absence);
        // presente sem relatório -> confirmação
        assert_eq!(classify(&entry(3, "C", None, Some(Present), false)), MessageType::Confirmation);
        // presente com relatório -> desempenho
        assert_eq!(classify(&entry(4, "D", None, Some(Present), true)), MessageType::Performance);
        // atrasado/dispensado contam como presença
        assert_eq!(classify(&entry(5, "E", None, Some(Late), true)), MessageType::Performance);
        assert_eq!(classify(&entry(6, "F", None, Some(Excused), false)), MessageType::Confirmation);
    }

    #[test]
    fn cenario_completo_de_uma_aula() {
        // Turma com 3 alunos: A presente com relatório, B ausente,
        // C sem registro de presença.
        let roster = vec![
            entry(1, "Ana", Some("01012345678"), Some(AttendanceStatus::Present), true),
            entry(2, "Bruno", Some("01087654321"), Some(AttendanceStatus::Absent), false),
            entry(3, "Clara", Some("01011112222"), None, false),
        ];

        let plan = plan_session_messages("Turma 3B", date(), &roster);

        assert_eq!(plan.messages.len(), 3);
        assert_eq!(plan.skipped, 0);

        let kinds: Vec<MessageType> = plan.messages.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![MessageType::Performance, MessageType::Absence, MessageType::Absence]
        );

        // O relatório de desempenho carrega os campos do report
        let performance = &plan.messages[0];
        assert!(performance.body.contains("Ana"));
        assert!(performance.body.contains("90/100"));
        assert!(performance.body.contains("(5/5)"));
    }

    #[test]
    fn aluno_sem_telefone_fica_fora_dos_totais() {
        let roster = vec![
            entry(1, "Ana", None, Some(AttendanceStatus::Present), false),
            entry(2, "Bruno", Some("  "), Some(AttendanceStatus::Absent), false),
            entry(3, "Clara", Some("01011112222"), Some(AttendanceStatus::Present), false),
        ];

        let plan = plan_session_messages("Turma 3B", date(), &roster);

        assert_eq!(plan.skipped, 2);
        assert_eq!(plan.messages.len(), 1);
        assert_eq!(plan.messages[0].student_name, "Clara");
    }
}
