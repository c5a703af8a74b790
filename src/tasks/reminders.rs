use anyhow::{Context, Result};
use time::PrimitiveDateTime;

use crate::core::state::AppState;
use crate::core::time::{days_until, format_primitive, primitive_now_utc};
use crate::domain::models::StudentEnrollment;
use crate::domain::types::NotificationKind;
use crate::services::{grading, ordering};

#[derive(Debug, Clone)]
pub(crate) struct EmailJob {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
}

#[derive(Debug)]
enum ReminderOutcome {
    NotDue,
    Completed,
    OptedOut,
    AlreadyReminded,
    Sent(EmailJob),
}

/// One scheduler tick: walk every deadline-bearing enrollment, record a
/// notification for each eligible one, then dispatch the collected emails.
/// Email delivery is best-effort and never blocks the notification or the
/// `reminder_sent` update.
pub(crate) async fn run_reminder_sweep(state: &AppState) -> Result<()> {
    let now = primitive_now_utc();
    let enrollments = state
        .store()
        .enrollments
        .list_with_deadline()
        .await
        .context("Failed to fetch enrollments with a deadline")?;

    let mut sent = 0;
    let mut email_jobs = Vec::new();

    for enrollment in &enrollments {
        match remind_enrollment(state, enrollment, now).await {
            Ok(ReminderOutcome::Sent(job)) => {
                sent += 1;
                email_jobs.push(job);
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(
                    enrollment_id = %enrollment.id,
                    error = %err,
                    "Failed to process reminder"
                );
            }
        }
    }

    let queued = email_jobs.len();
    let mut handles = Vec::with_capacity(email_jobs.len());
    for job in email_jobs {
        let mailer = state.mailer();
        handles.push(tokio::spawn(async move {
            if let Err(err) = mailer.send_email(&job.to, &job.subject, &job.body).await {
                tracing::warn!(to = %job.to, error = %err, "Failed to send reminder email");
                metrics::counter!("reminder_emails_failed_total").increment(1);
            }
        }));
    }
    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "Reminder email task join failed");
        }
    }

    tracing::info!(
        examined = enrollments.len(),
        sent,
        queued_emails = queued,
        "Reminder sweep finished"
    );
    metrics::counter!("reminders_sent_total").increment(sent as u64);
    metrics::counter!("reminder_emails_queued_total").increment(queued as u64);

    Ok(())
}

async fn remind_enrollment(
    state: &AppState,
    enrollment: &StudentEnrollment,
    now: PrimitiveDateTime,
) -> Result<ReminderOutcome> {
    let Some(deadline) = enrollment.deadline else {
        return Ok(ReminderOutcome::NotDue);
    };

    let store = state.store();
    let instance = store
        .instances
        .get_instance(&enrollment.instance_id)
        .await
        .context("Failed to load assignment instance")?;
    let questions = store
        .templates
        .questions_of(&instance.template_id)
        .await
        .context("Failed to load template questions")?;
    let ordered = ordering::ordered_questions(&questions, &instance.order);
    let answers = store
        .answers
        .answers_for(&enrollment.student_id, &instance.id)
        .await
        .context("Failed to load answer history")?;

    if grading::results(&ordered, &answers).completed {
        return Ok(ReminderOutcome::Completed);
    }

    let membership = store
        .roster
        .membership_for(&instance.group_id, &enrollment.student_id)
        .await
        .context("Failed to load group membership")?;
    if !membership.receive_emails {
        return Ok(ReminderOutcome::OptedOut);
    }

    let days_to_expiry = days_until(deadline, now);
    if days_to_expiry < 0 || days_to_expiry > enrollment.reminder_lead_days {
        return Ok(ReminderOutcome::NotDue);
    }

    let last_day = days_to_expiry <= 1;
    if !is_eligible(
        enrollment.reminder_sent,
        enrollment.remind_every_day,
        enrollment.remind_day_before,
        last_day,
    ) {
        return Ok(ReminderOutcome::AlreadyReminded);
    }

    let student = store
        .roster
        .get_student(&enrollment.student_id)
        .await
        .context("Failed to load student")?;
    let template = store
        .templates
        .get_template(&instance.template_id)
        .await
        .context("Failed to load assignment template")?;

    let link = format!("/assignments/{}", instance.id);
    store
        .notifications
        .create_notification(&student.id, NotificationKind::AssignmentDue, &link)
        .await
        .context("Failed to record reminder notification")?;
    store
        .enrollments
        .mark_reminded(&enrollment.id)
        .await
        .context("Failed to mark enrollment as reminded")?;

    tracing::debug!(
        student_id = %student.id,
        kind = NotificationKind::AssignmentDue.as_str(),
        days_to_expiry,
        "Reminder notification recorded"
    );

    Ok(ReminderOutcome::Sent(EmailJob {
        to: student.email,
        subject: format!("Assignment \"{}\" is due soon", template.title),
        body: reminder_body(&student.username, &template.title, deadline, days_to_expiry),
    }))
}

/// The first reminder always goes out; repeats only for an explicit daily
/// preference, or a day-before preference on the final-day tick.
fn is_eligible(reminder_sent: bool, every_day: bool, day_before: bool, last_day: bool) -> bool {
    !reminder_sent || every_day || (day_before && last_day)
}

fn reminder_body(
    username: &str,
    title: &str,
    deadline: PrimitiveDateTime,
    days_to_expiry: i64,
) -> String {
    let due = match days_to_expiry {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        days => format!("in {days} days"),
    };
    format!(
        "Hello {username},\n\n\
         Your assignment \"{title}\" is due {due} ({}).\n\
         Finish both answer rounds before the deadline.\n\n\
         The PeerTrack team",
        format_primitive(deadline)
    )
}
