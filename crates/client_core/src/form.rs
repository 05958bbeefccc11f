use chrono::NaiveDate;
use shared::{
    domain::{parse_input_date, parse_wire_date},
    protocol::{NewPrescription, Prescription, PrescriptionEdit},
};
use thiserror::Error;

pub const MAX_AGE: u32 = 150;
pub const GENDER_OPTIONS: [&str; 3] = ["male", "female", "other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    PrescriptionDate,
    Name,
    Age,
    Gender,
    NextVisitDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0:?} is required")]
    Required(FormField),
    #[error("age must be a whole number between 0 and 150")]
    InvalidAge,
    #[error("{0:?} must be a date in YYYY-MM-DD form")]
    InvalidDate(FormField),
}

/// Raw text of the create/edit form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrescriptionForm {
    pub prescription_date: String,
    pub name: String,
    pub age: String,
    pub gender: String,
    pub diagnosis: String,
    pub medicines: String,
    pub next_visit_date: String,
}

struct CommonFields {
    name: String,
    age: u32,
    gender: String,
    next_visit_date: Option<NaiveDate>,
}

impl PrescriptionForm {
    pub fn for_new(today: NaiveDate) -> Self {
        Self {
            prescription_date: today.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    pub fn from_existing(prescription: &Prescription) -> Self {
        let date_text = |raw: &str| {
            parse_wire_date(raw)
                .map(|day| day.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| raw.to_string())
        };
        Self {
            prescription_date: date_text(&prescription.prescription_date),
            name: prescription.name.clone(),
            age: prescription.age.to_string(),
            gender: prescription.gender.clone(),
            diagnosis: prescription.diagnosis.clone().unwrap_or_default(),
            medicines: prescription.medicines.clone().unwrap_or_default(),
            next_visit_date: prescription
                .next_visit_date
                .as_deref()
                .map(date_text)
                .unwrap_or_default(),
        }
    }

    pub fn to_new(&self) -> Result<NewPrescription, FormError> {
        let prescription_date = required_date(&self.prescription_date, FormField::PrescriptionDate)?;
        let common = self.common()?;
        Ok(NewPrescription {
            prescription_date,
            name: common.name,
            age: common.age,
            gender: common.gender,
            diagnosis: self.diagnosis.trim().to_string(),
            medicines: self.medicines.trim().to_string(),
            next_visit_date: common.next_visit_date,
        })
    }

    pub fn to_edit(&self) -> Result<PrescriptionEdit, FormError> {
        let common = self.common()?;
        Ok(PrescriptionEdit {
            name: common.name,
            age: common.age,
            gender: common.gender,
            diagnosis: self.diagnosis.trim().to_string(),
            medicines: self.medicines.trim().to_string(),
            next_visit_date: common.next_visit_date,
        })
    }

    fn common(&self) -> Result<CommonFields, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Required(FormField::Name));
        }

        let age = self.age.trim();
        if age.is_empty() {
            return Err(FormError::Required(FormField::Age));
        }
        let age = age
            .parse::<u32>()
            .ok()
            .filter(|age| *age <= MAX_AGE)
            .ok_or(FormError::InvalidAge)?;

        let gender = self.gender.trim().to_ascii_lowercase();
        if gender.is_empty() {
            return Err(FormError::Required(FormField::Gender));
        }

        let next_visit_date = match self.next_visit_date.trim() {
            "" => None,
            raw => Some(
                parse_input_date(raw).ok_or(FormError::InvalidDate(FormField::NextVisitDate))?,
            ),
        };

        Ok(CommonFields {
            name: name.to_string(),
            age,
            gender,
            next_visit_date,
        })
    }
}

fn required_date(raw: &str, field: FormField) -> Result<NaiveDate, FormError> {
    if raw.trim().is_empty() {
        return Err(FormError::Required(field));
    }
    parse_input_date(raw).ok_or(FormError::InvalidDate(field))
}
