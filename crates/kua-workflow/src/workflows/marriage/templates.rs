//! WhatsApp message bodies. Plain interpolation only; the output is sent as-is.

use super::domain::{ApplicationId, MarriageApplication};

/// Shown in rejection notices when staff left no reason.
pub const UNSPECIFIED_REASON: &str = "Tidak disebutkan";

const SIGN_OFF: &str = "Terima kasih,\nKUA";

pub fn applicant_confirmation(applicant_name: &str, application_id: &ApplicationId) -> String {
    format!(
        "Halo {applicant_name},\n\n\
         Pengajuan pernikahan Anda telah berhasil didaftarkan.\n\
         ID Aplikasi: {application_id}\n\
         Status: Menunggu Proses\n\n\
         Kami akan menginformasikan perkembangan selanjutnya.\n\n\
         {SIGN_OFF}"
    )
}

pub fn staff_new_application(
    applicant_name: &str,
    application_id: &ApplicationId,
    application: &MarriageApplication,
) -> String {
    format!(
        "Pengajuan pernikahan baru:\n\n\
         ID: {application_id}\n\
         Pemohon: {applicant_name}\n\
         Calon Suami: {groom}\n\
         Calon Istri: {bride}\n\n\
         Silakan proses di aplikasi KUA.",
        groom = application.groom_data.name,
        bride = application.bride_data.name,
    )
}

pub fn status_processed(applicant_name: &str, application_id: &ApplicationId) -> String {
    format!(
        "Halo {applicant_name},\n\n\
         Pengajuan pernikahan Anda (ID: {application_id}) sedang diproses oleh KUA.\n\n\
         Status: Dalam Proses\n\n\
         {SIGN_OFF}"
    )
}

pub fn status_validated(applicant_name: &str, application_id: &ApplicationId) -> String {
    format!(
        "Halo {applicant_name},\n\n\
         Pengajuan pernikahan Anda (ID: {application_id}) telah divalidasi oleh Dukcapil.\n\n\
         Status: Tervalidasi\n\n\
         {SIGN_OFF}"
    )
}

pub fn status_finished(applicant_name: &str, application_id: &ApplicationId) -> String {
    format!(
        "Halo {applicant_name},\n\n\
         Selamat! Pengajuan pernikahan Anda (ID: {application_id}) telah selesai diproses.\n\n\
         Status: Selesai\n\n\
         Silakan datang ke KUA untuk proses selanjutnya.\n\n\
         {SIGN_OFF}"
    )
}

pub fn status_rejected(
    applicant_name: &str,
    application_id: &ApplicationId,
    rejection_reason: Option<&str>,
) -> String {
    let reason = rejection_reason
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(UNSPECIFIED_REASON);
    format!(
        "Halo {applicant_name},\n\n\
         Mohon maaf, pengajuan pernikahan Anda (ID: {application_id}) ditolak.\n\n\
         Status: Ditolak\n\
         Alasan: {reason}\n\n\
         Silakan hubungi KUA untuk informasi lebih lanjut.\n\n\
         {SIGN_OFF}"
    )
}
