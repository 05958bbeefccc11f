//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{resolve_route, AuthSession, ClientSettings, HttpBackend, PrescriptionBackend};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::task::JoinHandle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: ClientSettings,
    session: AuthSession,
) {
    thread::spawn(move || {
        emit(&ui_tx, UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: failed to build runtime: {err}"),
                    )),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let backend: Arc<dyn PrescriptionBackend> =
                match HttpBackend::new(&settings, session.clone()) {
                    Ok(backend) => Arc::new(backend),
                    Err(err) => {
                        emit(
                            &ui_tx,
                            UiEvent::Error(UiError::from_client(
                                UiErrorContext::BackendStartup,
                                &err,
                            )),
                        );
                        tracing::error!("failed to build http backend: {err}");
                        return;
                    }
                };
            tracing::info!(api = %settings.api_base_url, "backend worker ready");
            emit(&ui_tx, UiEvent::Info("Backend worker ready".to_string()));

            let mut worker = Worker {
                backend,
                session,
                ui_tx,
                list_task: None,
                route_task: None,
            };
            while let Ok(cmd) = cmd_rx.recv() {
                worker.handle(cmd);
            }
            worker.abort_all();
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if let Err(TrySendError::Full(event)) = ui_tx.try_send(event) {
        tracing::warn!(?event, "ui event queue full; dropping event");
    }
}

/// Results the UI waits on: block until the UI drains the queue instead of dropping them.
fn deliver(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.send(event).is_err() {
        tracing::debug!("ui event queue closed; dropping result");
    }
}

fn abort(task: &mut Option<JoinHandle<()>>) {
    if let Some(task) = task.take() {
        task.abort();
    }
}

struct Worker {
    backend: Arc<dyn PrescriptionBackend>,
    session: AuthSession,
    ui_tx: Sender<UiEvent>,
    /// At most one list fetch is in flight; a newer one replaces it.
    list_task: Option<JoinHandle<()>>,
    route_task: Option<JoinHandle<()>>,
}

impl Worker {
    fn handle(&mut self, cmd: BackendCommand) {
        let backend = Arc::clone(&self.backend);
        let ui_tx = self.ui_tx.clone();

        match cmd {
            BackendCommand::Login { username, password } => {
                let session = self.session.clone();
                tokio::spawn(async move {
                    match backend.login(&username, &password).await {
                        Ok(token) => {
                            session.sign_in(token);
                            tracing::info!(%username, "signed in");
                            emit(&ui_tx, UiEvent::LoginOk);
                        }
                        Err(err) => {
                            tracing::warn!(%username, "login failed: {err}");
                            emit(
                                &ui_tx,
                                UiEvent::Error(UiError::from_client(UiErrorContext::Login, &err)),
                            );
                        }
                    }
                });
            }
            BackendCommand::Logout => {
                self.abort_all();
                self.session.sign_out();
                emit(&ui_tx, UiEvent::LoggedOut);
            }
            BackendCommand::FetchPrescriptions(request) => {
                abort(&mut self.list_task);
                self.list_task = Some(tokio::spawn(async move {
                    let query = request.query;
                    tracing::info!(
                        generation = request.generation,
                        page = query.page,
                        start = %query.start_date,
                        end = %query.end_date,
                        "fetching prescriptions"
                    );
                    let result = backend.list_prescriptions(&query).await;
                    deliver(
                        &ui_tx,
                        UiEvent::PrescriptionsLoaded {
                            generation: request.generation,
                            result,
                        },
                    );
                }));
            }
            BackendCommand::CancelPrescriptionFetch => abort(&mut self.list_task),
            BackendCommand::ResolveRoute { navigation, route } => {
                abort(&mut self.route_task);
                let session = self.session.clone();
                self.route_task = Some(tokio::spawn(async move {
                    let result = resolve_route(route, &session, &*backend).await;
                    deliver(&ui_tx, UiEvent::RouteResolved { navigation, result });
                }));
            }
            BackendCommand::LoadOverview => {
                tokio::spawn(async move {
                    let event = match backend.daily_counts().await {
                        Ok(counts) => UiEvent::OverviewLoaded(counts),
                        Err(err) => {
                            UiEvent::Error(UiError::from_client(UiErrorContext::Overview, &err))
                        }
                    };
                    emit(&ui_tx, event);
                });
            }
            BackendCommand::CreatePrescription(prescription) => {
                tokio::spawn(async move {
                    let event = match backend.create_prescription(&prescription).await {
                        Ok(ack) => UiEvent::PrescriptionSaved {
                            id: None,
                            message: ack.message,
                        },
                        Err(err) => UiEvent::Error(UiError::from_client(
                            UiErrorContext::SavePrescription,
                            &err,
                        )),
                    };
                    emit(&ui_tx, event);
                });
            }
            BackendCommand::UpdatePrescription { id, edit } => {
                tokio::spawn(async move {
                    let event = match backend.update_prescription(id, &edit).await {
                        Ok(ack) => UiEvent::PrescriptionSaved {
                            id: Some(id),
                            message: ack.message,
                        },
                        Err(err) => UiEvent::Error(UiError::from_client(
                            UiErrorContext::SavePrescription,
                            &err,
                        )),
                    };
                    emit(&ui_tx, event);
                });
            }
            BackendCommand::DeletePrescription { id } => {
                tokio::spawn(async move {
                    let event = match backend.delete_prescription(id).await {
                        Ok(ack) => UiEvent::PrescriptionDeleted {
                            id,
                            message: ack.message,
                        },
                        Err(err) => UiEvent::Error(UiError::from_client(
                            UiErrorContext::DeletePrescription,
                            &err,
                        )),
                    };
                    emit(&ui_tx, event);
                });
            }
        }
    }

    fn abort_all(&mut self) {
        abort(&mut self.list_task);
        abort(&mut self.route_task);
    }
}
