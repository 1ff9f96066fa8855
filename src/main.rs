use chrono::NaiveDate;
use std::error::Error;
use std::sync::Arc;
use stepform::WizardSession;
use stepform::config::WizardConfig;
use stepform::error::SubmissionError;
use stepform::logging::{init_logging, redact_value};
use stepform::signup::personal_details::{self, BIRTH_DATE, CPF, GENDER, NAME, PHONE, SURNAME};
use stepform::signup::{self, STUDENT_ID, StudentIdRecord};
use stepform::step::{SubmissionPayload, SubmitOutcome, Submitter};
use stepform::store::Record;
use tracing::{info, warn};

/// Stands in for the sign-up service: logs the request body it would send.
struct LoggingSubmitter;

impl Submitter for LoggingSubmitter {
    fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionError> {
        let json = serde_json::to_string(&payload.body).map_err(SubmissionError::Encode)?;
        info!(bytes = json.len(), body = redact_value(&json), "sending validation data");
        Ok(())
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => WizardConfig::load(path)?,
        None => WizardConfig::new(signup::flow_steps()),
    };
    init_logging(&config.log_config()?)?;

    let mut session = WizardSession::begin(&config);
    let student = StudentIdRecord {
        birth_date: NaiveDate::from_ymd_opt(2003, 2, 1).ok_or("invalid demo date")?,
        cpf: "52998224725".to_string(),
        email: "ana@aluno.fac.br".to_string(),
        registration: "2023001".to_string(),
        status: "ACTIVE".to_string(),
    };
    session.complete_step(STUDENT_ID, Record::from_serializable(&student)?)?;

    let mut controller = session.mount(personal_details::definition()?, Arc::new(LoggingSubmitter))?;

    controller.form_mut()?.set_input(NAME, "Ana")?;
    if let SubmitOutcome::Rejected { errors } = session.submit(&mut controller)? {
        for (field, message) in errors {
            warn!(%field, %message, "field rejected");
        }
    }

    let form = controller.form_mut()?;
    form.set_input(SURNAME, "Souza")?;
    form.set_input(CPF, "529.982.247-25")?;
    form.set_input(BIRTH_DATE, "01/02/2003")?;
    form.set_input(GENDER, "FEMALE")?;
    form.set_input(PHONE, "(12) 34567-8910")?;

    let outcome = session.submit(&mut controller)?;
    let (current, total) = session.flow().progress();
    info!(?outcome, current, total, "personal details submitted");

    let completions = session.complete();
    info!(
        submissions = completions.len(),
        failed = completions.iter().filter(|c| !c.is_success()).count(),
        "demo finished"
    );
    Ok(())
}
