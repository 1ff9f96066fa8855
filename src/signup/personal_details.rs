use crate::core::schema::{FieldSchema, FieldSpec, Keyboard, Mask};
use crate::error::{FormError, SubmissionError};
use crate::signup::gender::Gender;
use crate::signup::{ADDRESS, PERSONAL_DETAILS, STUDENT_ID, StudentIdRecord};
use crate::state::form::Snapshot;
use crate::state::store::Record;
use crate::step::definition::StepDefinition;
use crate::validation::ValidatorRegistry;
use crate::validation::validators::{chain, cpf, custom, required};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const NAME: &str = "name";
pub const SURNAME: &str = "surname";
pub const CPF: &str = "cpf";
pub const BIRTH_DATE: &str = "birthDate";
pub const GENDER: &str = "gender";
pub const PHONE: &str = "phone";

/// Stored output of the personal details step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetailsRecord {
    pub name: String,
    pub surname: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub cpf: String,
    pub phone: String,
}

/// Request body for the sign-up validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendValidationData {
    pub student_id: StudentIdRecord,
    pub personal_details: PersonalDetailsRecord,
}

impl SendValidationData {
    pub fn from_records(prior: Option<&Record>, current: &Snapshot) -> Result<Self, SubmissionError> {
        let student_id = prior
            .ok_or(SubmissionError::MissingRecord(STUDENT_ID))?
            .decode::<StudentIdRecord>()
            .map_err(SubmissionError::Encode)?;
        let personal_details = serde_json::to_value(current)
            .and_then(serde_json::from_value::<PersonalDetailsRecord>)
            .map_err(SubmissionError::Encode)?;

        Ok(Self {
            student_id,
            personal_details,
        })
    }
}

/// Request body for this step: `{ studentId, personalDetails }`.
pub fn shape_payload(
    prior: Option<&Record>,
    current: &Snapshot,
) -> Result<serde_json::Value, SubmissionError> {
    let body = SendValidationData::from_records(prior, current)?;
    serde_json::to_value(body).map_err(SubmissionError::Encode)
}

pub fn schema() -> Result<FieldSchema, FormError> {
    FieldSchema::new()
        .field(NAME, FieldSpec::text("Nome"))?
        .field(SURNAME, FieldSpec::text("Sobrenome"))?
        .field(
            CPF,
            FieldSpec::identifier("CPF")
                .with_placeholder("000.000.000-00")
                .with_keyboard(Keyboard::Numeric)
                .with_mask(Mask::Cpf),
        )?
        .field(
            BIRTH_DATE,
            FieldSpec::date("Data de Nascimento")
                .with_placeholder("01/02/2003")
                .with_keyboard(Keyboard::Numeric)
                .with_mask(Mask::DateDdMmYyyy),
        )?
        .field(GENDER, FieldSpec::choice("Gênero", Gender::options()))?
        .field(
            PHONE,
            FieldSpec::phone("Número de Celular")
                .with_placeholder("(12) 34567-8910")
                .with_keyboard(Keyboard::Numeric)
                .with_mask(Mask::Phone),
        )
}

pub fn validators() -> ValidatorRegistry {
    ValidatorRegistry::new()
        .with(NAME, required("Por favor, insira o seu Nome."))
        .with(SURNAME, required("Por favor, insira o seu Sobrenome."))
        .with(
            BIRTH_DATE,
            required("Por favor, insira a sua Data de Nascimento."),
        )
        .with(
            GENDER,
            chain(vec![
                required("Por favor, insira o seu Gênero."),
                custom(
                    |value| value.as_text().and_then(Gender::from_key).is_some(),
                    "Por favor, selecione um Gênero válido.",
                ),
            ]),
        )
        .with(
            CPF,
            chain(vec![
                required("Por favor, insira o seu CPF."),
                cpf("Por favor, insira um CPF válido."),
            ]),
        )
        .with(PHONE, required("Por favor, insira o seu Número de Celular."))
}

/// Personal details: reads the student id record and leads to the address step.
pub fn definition() -> Result<StepDefinition, FormError> {
    Ok(
        StepDefinition::new(PERSONAL_DETAILS, ADDRESS, schema()?, validators())
            .requires(STUDENT_ID)
            .payload(shape_payload),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::FieldKind;
    use crate::core::value::Value;
    use crate::state::form::FormState;
    use crate::state::store::WizardStore;
    use crate::step::collaborators::{SubmissionPayload, Submitter};
    use crate::step::controller::{StepContext, StepController, SubmitOutcome};
    use crate::task::SubmissionExecutor;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn form() -> FormState {
        definition().expect("definition").new_form()
    }

    fn fill_valid(form: &mut FormState) {
        form.set_input(NAME, "Ana").expect("name");
        form.set_input(SURNAME, "Souza").expect("surname");
        form.set_input(CPF, "529.982.247-25").expect("cpf");
        form.set_input(BIRTH_DATE, "01/02/2003").expect("birth date");
        form.set_input(GENDER, "FEMALE").expect("gender");
        form.set_input(PHONE, "(12) 34567-8910").expect("phone");
    }

    fn student() -> StudentIdRecord {
        StudentIdRecord {
            birth_date: NaiveDate::from_ymd_opt(2003, 2, 1).expect("date"),
            cpf: "52998224725".to_string(),
            email: "ana@aluno.fac.br".to_string(),
            registration: "2023001".to_string(),
            status: "ACTIVE".to_string(),
        }
    }

    #[test]
    fn schema_declares_screen_fields_in_order() {
        let schema = schema().expect("schema");
        let ids: Vec<&str> = schema.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec![NAME, SURNAME, CPF, BIRTH_DATE, GENDER, PHONE]);

        let cpf = schema.get(CPF).expect("cpf");
        assert_eq!(cpf.display.mask, Some(Mask::Cpf));
        assert_eq!(cpf.display.keyboard, Keyboard::Numeric);
        assert_eq!(schema.get(GENDER).expect("gender").display.options.len(), 4);
    }

    #[test]
    fn empty_form_reports_every_missing_field() {
        let mut form = form();
        assert!(!form.apply_validations());
        assert_eq!(form.errors().len(), 6);
        assert_eq!(form.error(CPF), Some("Por favor, insira o seu CPF."));
        assert_eq!(
            form.error(PHONE),
            Some("Por favor, insira o seu Número de Celular.")
        );
    }

    #[test]
    fn cpf_checks_required_before_checksum() {
        let mut form = form();
        fill_valid(&mut form);
        form.set_input(CPF, "529.982.247-24").expect("cpf");

        assert!(!form.apply_validations());
        assert_eq!(form.errors().len(), 1);
        assert_eq!(form.error(CPF), Some("Por favor, insira um CPF válido."));

        form.set_input(CPF, "").expect("cpf");
        form.apply_validations();
        assert_eq!(form.error(CPF), Some("Por favor, insira o seu CPF."));
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let mut form = form();
        fill_valid(&mut form);
        form.set_value(GENDER, Value::choice("ROBOT")).expect("gender");
        assert!(!form.apply_validations());
        assert_eq!(
            form.error(GENDER),
            Some("Por favor, selecione um Gênero válido.")
        );
    }

    #[test]
    fn valid_form_snapshot_decodes_as_record() {
        let mut form = form();
        fill_valid(&mut form);
        assert!(form.apply_validations());

        let record = Record::from_serializable(&form.snapshot()).expect("record");
        let details: PersonalDetailsRecord = record.decode().expect("decode");
        assert_eq!(details.gender, Gender::Female);
        assert_eq!(details.cpf, "52998224725");
        assert_eq!(details.phone, "12345678910");
        assert_eq!(
            details.birth_date,
            NaiveDate::from_ymd_opt(2003, 2, 1).expect("date")
        );
    }

    #[test]
    fn builds_validation_request_body() {
        let mut form = form();
        fill_valid(&mut form);
        let prior = Record::from_serializable(&student()).expect("record");

        let json = shape_payload(Some(&prior), &form.snapshot()).expect("body");

        assert_eq!(json["studentId"]["registration"], json!("2023001"));
        assert_eq!(json["studentId"]["birthDate"], json!("2003-02-01"));
        assert_eq!(json["personalDetails"]["surname"], json!("Souza"));
        assert_eq!(json["personalDetails"]["gender"], json!("FEMALE"));
    }

    #[test]
    fn request_body_needs_the_student_record() {
        assert!(matches!(
            SendValidationData::from_records(None, &form().snapshot()),
            Err(SubmissionError::MissingRecord(STUDENT_ID))
        ));
    }

    #[test]
    fn birth_date_refuses_text_values() {
        let mut form = form();
        fill_valid(&mut form);

        let err = form
            .set_value(BIRTH_DATE, Value::text("not a date"))
            .expect_err("text in a date field");
        assert_eq!(
            err,
            FormError::TypeMismatch {
                field: BIRTH_DATE.into(),
                kind: FieldKind::Date,
            }
        );
        assert!(form.apply_validations());
        assert!(shape_payload(
            Some(&Record::from_serializable(&student()).expect("record")),
            &form.snapshot()
        )
        .is_ok());
    }

    #[derive(Default)]
    struct CapturingSubmitter {
        bodies: Mutex<Vec<serde_json::Value>>,
    }

    impl Submitter for CapturingSubmitter {
        fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionError> {
            self.bodies
                .lock()
                .expect("body lock")
                .push(payload.body.clone());
            Ok(())
        }
    }

    #[test]
    fn submitter_receives_the_projected_body() {
        let submitter = Arc::new(CapturingSubmitter::default());
        let dyn_submitter: Arc<dyn Submitter> = submitter.clone();
        let mut controller = StepController::new(definition().expect("definition"), dyn_submitter);
        fill_valid(controller.form_mut().expect("editable"));

        let mut store = WizardStore::new();
        store.write(
            STUDENT_ID,
            Record::from_serializable(&student()).expect("record"),
        );
        let mut executor = SubmissionExecutor::new();
        let mut navigator = |_: &crate::core::StepKey| {};
        let outcome = controller
            .submit(&mut StepContext {
                store: &mut store,
                executor: &mut executor,
                navigator: &mut navigator,
            })
            .expect("submit");
        assert!(matches!(outcome, SubmitOutcome::Advanced { .. }));

        let completions = executor.wait_idle(Duration::from_secs(5));
        assert!(completions[0].is_success());

        let bodies = submitter.bodies.lock().expect("body lock");
        assert_eq!(bodies.len(), 1);
        let body = bodies[0].as_object().expect("object");
        assert_eq!(body.len(), 2);
        assert!(body.contains_key("studentId") && body.contains_key("personalDetails"));
        assert_eq!(bodies[0]["studentId"]["email"], json!("ana@aluno.fac.br"));
        assert_eq!(bodies[0]["personalDetails"]["cpf"], json!("52998224725"));
    }
}
