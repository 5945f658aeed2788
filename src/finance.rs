//! Financial report assembly for the admin dashboard.
//!
//! Turns billed appointments into a three-section `ReportRequest`
//! (summary, income detail, income per specialty) for a reporting period.
//! Only completed appointments produce income.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::report::{Cell, ReportRequest, Section};

// ─── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// One appointment as the dashboard lists it, with its fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BilledAppointment {
    pub date: NaiveDate,
    pub patient: String,
    pub doctor: String,
    pub specialty: String,
    pub amount: f64,
    pub status: AppointmentStatus,
}

/// Reporting window, relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    ThisWeek,
    ThisMonth,
    ThisYear,
    All,
}

impl Period {
    /// Label shown in the report subtitle.
    pub fn label(self) -> &'static str {
        match self {
            Period::Today => "Hoy",
            Period::ThisWeek => "Esta Semana",
            Period::ThisMonth => "Este Mes",
            Period::ThisYear => "Este Año",
            Period::All => "Todo",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Period::Today => "hoy",
            Period::ThisWeek => "semana",
            Period::ThisMonth => "mes",
            Period::ThisYear => "anio",
            Period::All => "todo",
        }
    }

    /// Whether `date` falls in this period as seen from `today`.
    /// Weeks are ISO weeks (Monday first).
    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Period::Today => date == today,
            Period::ThisWeek => date.iso_week() == today.iso_week(),
            Period::ThisMonth => date.year() == today.year() && date.month() == today.month(),
            Period::ThisYear => date.year() == today.year(),
            Period::All => true,
        }
    }
}

/// Wire request for `POST /api/reports/financial`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReportRequest {
    pub period: Period,
    /// Defaults to the server's local date.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    #[serde(default)]
    pub appointments: Vec<BilledAppointment>,
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${amount:.2}")
    }
}

pub fn build_financial_report(
    appointments: &[BilledAppointment],
    period: Period,
    today: NaiveDate,
) -> ReportRequest {
    let in_period: Vec<&BilledAppointment> = appointments
        .iter()
        .filter(|a| period.contains(a.date, today))
        .collect();

    let mut completed: Vec<&BilledAppointment> = in_period
        .iter()
        .copied()
        .filter(|a| a.status == AppointmentStatus::Completed)
        .collect();
    completed.sort_by_key(|a| a.date);

    let cancelled = in_period
        .iter()
        .filter(|a| a.status == AppointmentStatus::Cancelled)
        .count();
    let total: f64 = completed.iter().map(|a| a.amount).sum();
    let average = if completed.is_empty() {
        0.0
    } else {
        total / completed.len() as f64
    };

    let summary = Section::new("Resumen", &["Concepto", "Valor"])
        .with_row(vec![Cell::from("Ingresos totales"), Cell::from(format_currency(total))])
        .with_row(vec![Cell::from("Citas completadas"), Cell::from(completed.len())])
        .with_row(vec![Cell::from("Citas canceladas"), Cell::from(cancelled)])
        .with_row(vec![Cell::from("Ticket promedio"), Cell::from(format_currency(average))]);

    let mut income = Section::new("Ingresos", &["Fecha", "Paciente", "Doctor", "Monto"]);
    for a in &completed {
        income = income.with_row(vec![
            Cell::from(a.date.format("%Y-%m-%d").to_string()),
            Cell::from(a.patient.as_str()),
            Cell::from(a.doctor.as_str()),
            Cell::from(format_currency(a.amount)),
        ]);
    }

    let mut per_specialty: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for a in &completed {
        let entry = per_specialty.entry(a.specialty.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += a.amount;
    }
    let mut ranked: Vec<(&str, usize, f64)> = per_specialty
        .into_iter()
        .map(|(name, (count, amount))| (name, count, amount))
        .collect();
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(b.0)));

    let mut specialties = Section::new("Por Especialidad", &["Especialidad", "Citas", "Monto"]);
    for (name, count, amount) in ranked {
        specialties = specialties.with_row(vec![
            Cell::from(name),
            Cell::from(count),
            Cell::from(format_currency(amount)),
        ]);
    }

    ReportRequest {
        title: "Reporte Financiero".to_string(),
        subtitle: format!("Periodo: {}", period.label()),
        sections: vec![summary, income, specialties],
        file_name: format!("reporte-financiero-{}.pdf", period.slug()),
    }
}
