//! Session object behaviour while a submission is running.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use consult_orders_core::{
    open_session_in_memory, ConsultOrdersError, FfiChannelOutcome, FfiDraftInput, PatientNotifier,
};

/// Host notifier that parks inside the notification step until released.
struct GatedNotifier {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl PatientNotifier for GatedNotifier {
    fn notify_patient(
        &self,
        _patient_id: String,
        _note_id: String,
        _template_id: String,
        _body: String,
    ) -> Vec<FfiChannelOutcome> {
        if let Ok(entered) = self.entered.lock() {
            let _ = entered.send(());
        }
        if let Ok(release) = self.release.lock() {
            let _ = release.recv_timeout(Duration::from_secs(10));
        }
        vec![FfiChannelOutcome {
            channel: "sms".into(),
            delivered: true,
            error: None,
        }]
    }
}

fn draft_input() -> FfiDraftInput {
    FfiDraftInput {
        patient_id: Some("patient-1".into()),
        provider_id: Some("provider-1".into()),
        service_id: Some("weight-management".into()),
        service_name: Some("Weight Management".into()),
        hpi: "BMI 31, asking about GLP-1 options".into(),
        pmh: String::new(),
        contraindications: String::new(),
        assessment_plan: String::new(),
        patient_history: String::new(),
        follow_up_period: Some("4w".into()),
        follow_up_display: Some("Follow up in 4 weeks".into()),
        follow_up_template: Some("wm-4w".into()),
        resource_ids: vec![],
    }
}

#[test]
fn test_pricing_and_status_readable_during_submission() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let core = open_session_in_memory(
        None,
        Box::new(GatedNotifier {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }),
    )
    .unwrap();
    core.toggle_medication("semaglutide".into()).unwrap();
    assert!(!core.is_submitting());

    let running = {
        let core = core.clone();
        thread::spawn(move || core.submit_consultation(draft_input()))
    };
    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("submission reached the notification step");

    assert!(core.is_submitting());

    let (price_tx, price_rx) = mpsc::channel();
    let reader = core.clone();
    thread::spawn(move || {
        let _ = price_tx.send(reader.price_for_follow_up("4w".into()));
    });
    let price = price_rx
        .recv_timeout(Duration::from_secs(1))
        .expect("pricing lookup waited on the running submission");
    assert_eq!(price, 12_500);

    assert!(matches!(
        core.submit_consultation(draft_input()),
        Err(ConsultOrdersError::SubmissionInProgress(_))
    ));

    release_tx.send(()).unwrap();
    let receipt = running.join().unwrap().unwrap();
    assert!(receipt.notification_sent);
    assert!(receipt.invoice_id.is_some());
    assert!(!core.is_submitting());
}

#[test]
fn test_pricing_without_submission() {
    let core = open_session_in_memory(
        Some(r#"{"pricing": {"2w": 1000, "4w": 2000, "6w": 3000, "custom": 4000}}"#.into()),
        Box::new(GatedNotifier {
            entered: Mutex::new(mpsc::channel().0),
            release: Mutex::new(mpsc::channel().1),
        }),
    )
    .unwrap();

    assert_eq!(core.price_for_follow_up("2w".into()), 1000);
    assert_eq!(core.price_for_follow_up("3mo".into()), 4000);
}
