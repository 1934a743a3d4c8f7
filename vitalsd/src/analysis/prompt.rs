//! Prompt rendering.
//!
//! One fixed template per signal kind. Statistics are shown with one decimal; the raw series is cut
//! to the kind's limit and marked as continuing when longer.

use std::fmt::{self, Display, Write as _};

use super::stats::SignalSummary;
use super::AnalysisRequest;

/// A rendered prompt, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Prompt(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn build_prompt(request: &AnalysisRequest, summary: &SignalSummary) -> Prompt {
    let limit = request.kind().prompt_series_limit();

    let text = match request {
        AnalysisRequest::Ecg { voltages, heart_rate } => ecg_prompt(*heart_rate, &render_series(voltages, limit), summary),
        AnalysisRequest::HeartRate { bpm_values, .. } => heart_rate_prompt(&render_series(bpm_values, limit), summary),
        AnalysisRequest::Glucose { entries } => {
            let readings: Vec<_> = entries
                .iter()
                .map(|entry| Reading {
                    value: entry.value,
                    timestamp: &entry.timestamp,
                })
                .collect();
            glucose_prompt(&render_series(&readings, limit), summary)
        }
        AnalysisRequest::Hrv { rr_intervals, .. } => hrv_prompt(&render_series(rr_intervals, limit), summary),
    };

    Prompt(text)
}

/// Render the first `limit` items as a list, with a continuation marker when more remain.
pub fn render_series<T: Display>(items: &[T], limit: usize) -> String {
    let shown: Vec<String> = items.iter().take(limit).map(ToString::to_string).collect();
    let mut out = format!("[{}]", shown.join(", "));
    if items.len() > limit {
        let _ = write!(out, " ... (seri devam ediyor: toplam {} değerin ilk {} tanesi gösterildi)", items.len(), limit);
    }
    out
}

/// One decimal place, for human-facing statistics.
pub fn one_decimal(value: f64) -> String {
    format!("{value:.1}")
}

struct Reading<'a> {
    value: f64,
    timestamp: &'a str,
}

impl Display for Reading<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mg/dL ({})", self.value, self.timestamp)
    }
}

fn ecg_prompt(heart_rate: Option<f64>, series: &str, summary: &SignalSummary) -> String {
    let heart_rate = heart_rate
        .filter(|bpm| *bpm > 0.0)
        .map(one_decimal)
        .unwrap_or_else(|| "bilinmiyor".to_string());

    format!(
        "📈 Nabız: {heart_rate} bpm\n\
         🔌 Voltajlar: {series}\n\
         📊 Özet: {count} örnek, ortalama {avg}, en düşük {min}, en yüksek {max}\n\n\
         Bu EKG verisini tıbbi olarak analiz et.\n\
         - P, QRS ve T dalgalarını açıkla\n\
         - Ritim tipi belirt\n\
         - Varsa anormallikleri yorumla\n\
         - Açıklaman kısa ve net olsun (maksimum 4 cümle).\n",
        count = summary.count,
        avg = one_decimal(summary.average),
        min = one_decimal(summary.min),
        max = one_decimal(summary.max),
    )
}

fn heart_rate_prompt(series: &str, summary: &SignalSummary) -> String {
    format!(
        "Aşağıda bir kullanıcının nabız (BPM) ölçümleri var.\n\
         Geçerli ölçüm sayısı: {count}\n\
         Ortalama: {avg} BPM\n\
         En düşük: {min} BPM\n\
         En yüksek: {max} BPM\n\
         Ölçümler: {series}\n\n\
         Bu verileri şu başlıklar altında değerlendir:\n\
         1. Genel nabız düzeyi (dinlenme aralığı olan 60-100 BPM ile karşılaştır)\n\
         2. Değişkenlik, ani yükselme ve düşüşler\n\
         3. Olası bradikardi veya taşikardi belirtileri\n\
         4. Yaşam tarzına yönelik kısa öneriler\n\
         Her başlık için en fazla 2 cümle yaz; toplam yanıtın 8 cümleyi geçmesin.\n",
        count = summary.count,
        avg = one_decimal(summary.average),
        min = one_decimal(summary.min),
        max = one_decimal(summary.max),
    )
}

fn glucose_prompt(series: &str, summary: &SignalSummary) -> String {
    format!(
        "Aşağıda bir kullanıcının kan şekeri (glukoz) ölçümleri var, birim mg/dL.\n\
         Geçerli ölçüm sayısı: {count}\n\
         Ortalama: {avg} mg/dL\n\
         En düşük: {min} mg/dL\n\
         En yüksek: {max} mg/dL\n\
         Ölçümler: {series}\n\n\
         Bu değerleri yorumla:\n\
         - Hipoglisemi (70 mg/dL altı) veya hiperglisemi (180 mg/dL üstü) var mı?\n\
         - Gün içindeki dalgalanmayı değerlendir\n\
         - Kısa ve uygulanabilir bir öneri ver\n\
         Yanıtın en fazla 5 cümle olsun.\n",
        count = summary.count,
        avg = one_decimal(summary.average),
        min = one_decimal(summary.min),
        max = one_decimal(summary.max),
    )
}

fn hrv_prompt(series: &str, summary: &SignalSummary) -> String {
    let mut metrics = format!(
        "RR aralığı sayısı: {count}\n\
         Ortalama RR: {avg} ms\n\
         En kısa RR: {min} ms\n\
         En uzun RR: {max} ms\n",
        count = summary.count,
        avg = one_decimal(summary.average),
        min = one_decimal(summary.min),
        max = one_decimal(summary.max),
    );
    if let Some(sdnn) = summary.sdnn {
        let _ = writeln!(metrics, "SDNN: {} ms", one_decimal(sdnn));
    }
    if let Some(rmssd) = summary.rmssd {
        let _ = writeln!(metrics, "RMSSD: {} ms", one_decimal(rmssd));
    }

    format!(
        "Aşağıda bir kullanıcının RR aralıkları (ms) ve kalp hızı değişkenliği (HRV) ölçümleri var.\n\
         {metrics}\
         RR aralıkları: {series}\n\n\
         Kalp hızı değişkenliğini değerlendir: otonom sinir sistemi dengesi, stres ve toparlanma durumu, \
         dikkat edilmesi gerekenler. Tıbbi teşhis koyma. Yanıtın en fazla 4 cümle olsun.\n\n\
         Örnek olumlu yanıt: \"SDNN ve RMSSD değerlerin iyi bir düzeyde; bu, parasempatik aktivitenin güçlü \
         olduğunu ve vücudunun iyi toparlandığını gösteriyor. Mevcut uyku ve egzersiz düzenini korumaya devam et.\"\n\
         Örnek olumsuz yanıt: \"RMSSD değerin düşük; bu, son dönemde stres ya da yorgunluğun toparlanmanı \
         zorlaştırdığını gösterebilir. Uyku süreni artırmayı ve yoğun antrenmanlara kısa bir ara vermeyi düşünebilirsin.\"\n"
    )
}
