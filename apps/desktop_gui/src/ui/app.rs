use std::time::Duration;

use chrono::{Local, NaiveDate};
use client_core::{
    form::GENDER_OPTIONS,
    render_list, render_overview,
    view::{display_date, title_case, OverviewModel, RowView},
    AuthSession, ClientError, ClientSettings, Completion, ListBody, ListController, ListIntent,
    PrescriptionForm, ResolvedRoute, Route, RouteError,
};
use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{parse_input_date, PrescriptionId},
    protocol::{Page, Prescription, PrescriptionSummary},
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{classify_login_failure, UiError, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
    reducer::{NavStep, Navigator},
};

pub const SETTINGS_STORAGE_KEY: &str = "rx_desk_gui_settings";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedDesktopSettings {
    pub last_username: String,
}

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub settings: ClientSettings,
    pub initial_route: Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    message: String,
}

enum Screen {
    Login,
    Overview(Option<OverviewModel>),
    List,
    Detail {
        prescription: Prescription,
        confirm_delete: bool,
    },
    Edit {
        prescription: Prescription,
        form: PrescriptionForm,
        error: Option<String>,
        saving: bool,
    },
    Create {
        form: PrescriptionForm,
        error: Option<String>,
        saving: bool,
    },
    Failed {
        title: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateField {
    Start,
    End,
}

/// Clicks collected while drawing, applied once the frame is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiAction {
    Navigate(Route),
    List(ListIntent),
    CommitDate(DateField),
    SubmitForm,
    Delete(PrescriptionId),
    RefreshOverview,
    SignOut,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct RxDeskApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: AuthSession,
    settings: ClientSettings,
    navigator: Navigator,
    screen: Screen,
    list: ListController,
    start_date_input: String,
    end_date_input: String,
    date_input_error: Option<String>,
    username: String,
    password: String,
    login_pending: bool,
    focus_login: bool,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl RxDeskApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        session: AuthSession,
        persisted_settings: Option<PersistedDesktopSettings>,
        startup: StartupConfig,
    ) -> Self {
        let persisted = persisted_settings.unwrap_or_default();
        let mut app = Self {
            cmd_tx,
            ui_rx,
            session,
            list: ListController::new(today(), startup.settings.page_size),
            settings: startup.settings,
            navigator: Navigator::new(),
            screen: Screen::Login,
            start_date_input: String::new(),
            end_date_input: String::new(),
            date_input_error: None,
            username: persisted.last_username,
            password: String::new(),
            login_pending: false,
            focus_login: true,
            status: "Starting backend worker...".to_string(),
            status_banner: None,
        };
        app.sync_date_inputs();
        app.navigate(startup.initial_route);
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::LoginOk => {
                    self.login_pending = false;
                    self.password.clear();
                    self.status = format!("Signed in as {}", self.username);
                    self.status_banner = None;
                    let target = self.navigator.take_after_login();
                    self.navigate(target);
                }
                UiEvent::LoggedOut => self.status = "Signed out".to_string(),
                UiEvent::PrescriptionsLoaded { generation, result } => {
                    self.on_prescriptions_loaded(generation, result);
                }
                UiEvent::RouteResolved { navigation, result } => {
                    self.on_route_resolved(navigation, result);
                }
                UiEvent::OverviewLoaded(counts) => {
                    if let Screen::Overview(model) = &mut self.screen {
                        *model = Some(render_overview(&counts));
                    }
                }
                UiEvent::PrescriptionSaved { id, message } => {
                    self.show_info(non_empty_or(message, "Prescription saved"));
                    match id {
                        Some(id) => self.navigate(Route::PrescriptionDetail(id)),
                        None => self.navigate(Route::PrescriptionList),
                    }
                }
                UiEvent::PrescriptionDeleted { id, message } => {
                    tracing::info!(id = id.0, "prescription deleted");
                    self.show_info(non_empty_or(message, "Prescription deleted"));
                    self.navigate(Route::PrescriptionList);
                }
                UiEvent::Error(error) => self.on_error(error),
            }
        }
    }

    fn on_prescriptions_loaded(
        &mut self,
        generation: u64,
        result: Result<Page<PrescriptionSummary>, ClientError>,
    ) {
        let failure = result
            .as_ref()
            .err()
            .map(|err| UiError::from_client(UiErrorContext::ListPrescriptions, err));
        let rejected = failure.as_ref().is_some_and(UiError::requires_reauth);
        if self.list.complete(generation, result) == Completion::Applied && rejected {
            self.expire_session(Route::PrescriptionList);
        }
    }

    fn on_route_resolved(&mut self, navigation: u64, result: Result<ResolvedRoute, RouteError>) {
        if !self.navigator.settle(navigation) {
            return;
        }
        match result {
            Ok(resolved) => self.enter(resolved),
            Err(RouteError::Unauthenticated { route }) => self.expire_session(route),
            Err(err) => {
                let error = UiError::from_route(&err);
                tracing::warn!(category = ?error.category(), "route failed: {err}");
                self.leave_list();
                self.screen = Screen::Failed {
                    title: self.navigator.current().title(),
                    message: error.message().to_string(),
                };
            }
        }
    }

    fn on_error(&mut self, error: UiError) {
        tracing::warn!(
            context = ?error.context(),
            category = ?error.category(),
            "{}",
            error.message()
        );
        if error.context() == UiErrorContext::Login {
            self.login_pending = false;
            self.set_error_banner(classify_login_failure(&error));
            return;
        }
        if error.requires_reauth() {
            self.expire_session(self.navigator.current());
            return;
        }

        let message = error.message().to_string();
        match (&mut self.screen, error.context()) {
            (
                Screen::Edit { error: slot, saving, .. } | Screen::Create { error: slot, saving, .. },
                UiErrorContext::SavePrescription,
            ) => {
                *saving = false;
                *slot = Some(message);
                return;
            }
            (Screen::Detail { confirm_delete, .. }, UiErrorContext::DeletePrescription) => {
                *confirm_delete = false;
            }
            _ => {}
        }
        self.set_error_banner(message);
    }

    fn navigate(&mut self, route: Route) {
        match self.navigator.request(route, &self.session) {
            NavStep::ShowLogin => self.enter_login(),
            NavStep::Resolve { navigation, route } => {
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::ResolveRoute { navigation, route },
                    &mut self.status,
                );
            }
        }
    }

    fn enter(&mut self, resolved: ResolvedRoute) {
        let was_list = matches!(self.screen, Screen::List);
        if !matches!(resolved, ResolvedRoute::PrescriptionList) {
            self.leave_list();
        }

        let screen = match resolved {
            ResolvedRoute::Login => {
                self.enter_login();
                return;
            }
            ResolvedRoute::Overview => {
                self.send(BackendCommand::LoadOverview);
                Screen::Overview(None)
            }
            ResolvedRoute::PrescriptionList => {
                if !was_list {
                    let request = self.list.mount(today());
                    self.sync_date_inputs();
                    self.date_input_error = None;
                    self.send(BackendCommand::FetchPrescriptions(request));
                }
                Screen::List
            }
            ResolvedRoute::PrescriptionDetail(prescription) => Screen::Detail {
                prescription,
                confirm_delete: false,
            },
            ResolvedRoute::EditPrescription(prescription) => Screen::Edit {
                form: PrescriptionForm::from_existing(&prescription),
                prescription,
                error: None,
                saving: false,
            },
            ResolvedRoute::CreatePrescription => Screen::Create {
                form: PrescriptionForm::for_new(today()),
                error: None,
                saving: false,
            },
        };
        self.screen = screen;
    }

    fn enter_login(&mut self) {
        self.leave_list();
        self.screen = Screen::Login;
        self.password.clear();
        self.login_pending = false;
        self.focus_login = true;
    }

    /// Unmounting the list: late responses for it must be ignored.
    fn leave_list(&mut self) {
        if matches!(self.screen, Screen::List) {
            self.list.teardown();
            self.send(BackendCommand::CancelPrescriptionFetch);
        }
    }

    fn expire_session(&mut self, then: Route) {
        tracing::info!(route = %then, "session rejected; returning to login");
        self.session.sign_out();
        self.navigator.redirect_to_login(then);
        self.enter_login();
        self.set_error_banner("Your session has expired; sign in again.".to_string());
    }

    fn sign_out(&mut self) {
        self.send(BackendCommand::Logout);
        self.session.sign_out();
        self.navigator.redirect_to_login(Route::Login);
        self.enter_login();
        self.status_banner = None;
    }

    fn try_login(&mut self) {
        let username = self.username.trim().to_string();
        if username.is_empty() || self.password.is_empty() {
            self.set_error_banner("Username and password are required.".to_string());
            return;
        }
        self.status_banner = None;
        self.login_pending = true;
        self.status = format!("Signing in as {username}...");
        let sent = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Login {
                username,
                password: self.password.clone(),
            },
            &mut self.status,
        );
        if !sent {
            self.login_pending = false;
            self.set_error_banner(self.status.clone());
        }
    }

    fn send(&mut self, cmd: BackendCommand) {
        if !dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.set_error_banner(self.status.clone());
        }
    }

    fn dispatch_list_intent(&mut self, intent: ListIntent) {
        if let Some(request) = self.list.dispatch(intent) {
            self.send(BackendCommand::FetchPrescriptions(request));
        }
        if matches!(intent, ListIntent::Reset { .. }) {
            self.date_input_error = None;
        }
        self.sync_date_inputs();
    }

    fn commit_date_input(&mut self, field: DateField) {
        let raw = match field {
            DateField::Start => &self.start_date_input,
            DateField::End => &self.end_date_input,
        };
        match parse_input_date(raw) {
            Some(date) => {
                self.date_input_error = None;
                let intent = match field {
                    DateField::Start => ListIntent::SetStartDate(date),
                    DateField::End => ListIntent::SetEndDate(date),
                };
                self.dispatch_list_intent(intent);
            }
            None => {
                let label = match field {
                    DateField::Start => "Start date",
                    DateField::End => "End date",
                };
                self.date_input_error = Some(format!("{label} must be a date like 2024-06-01."));
            }
        }
    }

    fn sync_date_inputs(&mut self) {
        let query = self.list.query();
        self.start_date_input = query.start_date.format("%Y-%m-%d").to_string();
        self.end_date_input = query.end_date.format("%Y-%m-%d").to_string();
    }

    fn submit_form(&mut self) {
        let command = match &mut self.screen {
            Screen::Edit {
                prescription,
                form,
                error,
                saving,
            } => match form.to_edit() {
                Ok(edit) => {
                    *error = None;
                    *saving = true;
                    Some(BackendCommand::UpdatePrescription {
                        id: prescription.id,
                        edit,
                    })
                }
                Err(err) => {
                    *error = Some(err.to_string());
                    None
                }
            },
            Screen::Create {
                form,
                error,
                saving,
            } => match form.to_new() {
                Ok(new) => {
                    *error = None;
                    *saving = true;
                    Some(BackendCommand::CreatePrescription(new))
                }
                Err(err) => {
                    *error = Some(err.to_string());
                    None
                }
            },
            _ => None,
        };

        if let Some(command) = command {
            if !dispatch_backend_command(&self.cmd_tx, command, &mut self.status) {
                if let Screen::Edit { error, saving, .. } | Screen::Create { error, saving, .. } =
                    &mut self.screen
                {
                    *saving = false;
                    *error = Some(self.status.clone());
                }
            }
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Navigate(route) => self.navigate(route),
            UiAction::List(intent) => self.dispatch_list_intent(intent),
            UiAction::CommitDate(field) => self.commit_date_input(field),
            UiAction::SubmitForm => self.submit_form(),
            UiAction::Delete(id) => self.send(BackendCommand::DeletePrescription { id }),
            UiAction::RefreshOverview => {
                if let Screen::Overview(model) = &mut self.screen {
                    *model = None;
                }
                self.send(BackendCommand::LoadOverview);
            }
            UiAction::SignOut => self.sign_out(),
        }
    }

    fn show_info(&mut self, message: String) {
        self.status = message.clone();
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Info,
            message,
        });
    }

    fn set_error_banner(&mut self, message: String) {
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message,
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Info => (
                    egui::Color32::from_rgb(42, 78, 58),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(88, 150, 110)),
                ),
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        if ui.small_button("Dismiss").clicked() {
                            self.status_banner = None;
                        }
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_login_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let avail = ui.available_size();
            let card_width = avail.x.clamp(380.0, 480.0);
            ui.add_space((avail.y * 0.15).clamp(18.0, 120.0));

            ui.vertical_centered(|ui| {
                ui.set_width(card_width);
                egui::Frame::NONE
                    .fill(ui.visuals().faint_bg_color)
                    .corner_radius(14.0)
                    .stroke(egui::Stroke::new(
                        1.0,
                        ui.visuals().widgets.noninteractive.bg_stroke.color,
                    ))
                    .inner_margin(egui::Margin::symmetric(20, 18))
                    .show(ui, |ui| {
                        ui.style_mut().spacing.item_spacing = egui::vec2(10.0, 10.0);
                        ui.heading("Prescription Desk");
                        ui.weak(format!("Sign in to {}", self.settings.api_base_url));
                        ui.add_space(8.0);
                        self.show_status_banner(ui);

                        let focus = std::mem::take(&mut self.focus_login);
                        let user_resp = login_text_field(
                            ui,
                            "login_username",
                            "Username",
                            "doctor",
                            &mut self.username,
                            false,
                            focus,
                        );
                        let pass_resp = login_text_field(
                            ui,
                            "login_password",
                            "Password",
                            "password",
                            &mut self.password,
                            true,
                            false,
                        );

                        let enter_pressed = ctx.input(|i| i.key_pressed(egui::Key::Enter));
                        let submit_from_keyboard = enter_pressed
                            && (user_resp.lost_focus() || pass_resp.lost_focus());

                        ui.add_space(6.0);
                        let btn = egui::Button::new(
                            egui::RichText::new(if self.login_pending {
                                "Signing in..."
                            } else {
                                "Sign in"
                            })
                            .strong()
                            .size(16.0),
                        )
                        .min_size(egui::vec2(ui.available_width(), 40.0));
                        let clicked = ui.add_enabled(!self.login_pending, btn).clicked();
                        if (clicked || submit_from_keyboard) && !self.login_pending {
                            self.try_login();
                        }

                        ui.separator();
                        ui.horizontal_wrapped(|ui| {
                            ui.small("Status:");
                            ui.small(egui::RichText::new(&self.status).weak());
                        });
                    });
            });
        });
    }

    fn show_top_bar(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.strong("Prescription Desk");
                ui.separator();
                let current = self.navigator.current();
                for (label, route) in [
                    ("Overview", Route::Overview),
                    ("Prescriptions", Route::PrescriptionList),
                    ("New prescription", Route::CreatePrescription),
                ] {
                    if ui.selectable_label(current == route, label).clicked() {
                        actions.push(UiAction::Navigate(route));
                    }
                }
                if self.navigator.pending_route().is_some() {
                    ui.spinner();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Sign out").clicked() {
                        actions.push(UiAction::SignOut);
                    }
                    ui.small(egui::RichText::new(&self.status).weak());
                });
            });
            ui.add_space(4.0);
        });
    }

    fn show_main_workspace(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();
        self.show_top_bar(ctx, &mut actions);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            if matches!(self.screen, Screen::List) {
                self.show_prescription_list(ui, &mut actions);
                return;
            }
            match &mut self.screen {
                Screen::Overview(model) => show_overview(ui, model.as_ref(), &mut actions),
                Screen::Detail {
                    prescription,
                    confirm_delete,
                } => show_prescription_detail(ui, prescription, confirm_delete, &mut actions),
                Screen::Edit {
                    prescription,
                    form,
                    error,
                    saving,
                } => {
                    ui.heading(Route::EditPrescription(prescription.id).title());
                    ui.add_space(8.0);
                    show_prescription_form(
                        ui,
                        form,
                        true,
                        error.as_deref(),
                        *saving,
                        Route::PrescriptionDetail(prescription.id),
                        &mut actions,
                    );
                }
                Screen::Create {
                    form,
                    error,
                    saving,
                } => {
                    ui.heading(Route::CreatePrescription.title());
                    ui.add_space(8.0);
                    show_prescription_form(
                        ui,
                        form,
                        false,
                        error.as_deref(),
                        *saving,
                        Route::PrescriptionList,
                        &mut actions,
                    );
                }
                Screen::Failed { title, message } => {
                    ui.heading(*title);
                    ui.add_space(8.0);
                    ui.colored_label(ui.visuals().error_fg_color, message.as_str());
                    ui.add_space(8.0);
                    if ui.button("Back to prescriptions").clicked() {
                        actions.push(UiAction::Navigate(Route::PrescriptionList));
                    }
                }
                Screen::Login | Screen::List => {}
            }
        });

        for action in actions {
            self.apply(action);
        }
    }

    fn show_prescription_list(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let model = render_list(&self.list);

        ui.heading(Route::PrescriptionList.title());
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("From");
            let start = ui.add(
                egui::TextEdit::singleline(&mut self.start_date_input)
                    .id_salt("list_start_date")
                    .hint_text("YYYY-MM-DD")
                    .desired_width(110.0),
            );
            ui.label("To");
            let end = ui.add(
                egui::TextEdit::singleline(&mut self.end_date_input)
                    .id_salt("list_end_date")
                    .hint_text("YYYY-MM-DD")
                    .desired_width(110.0),
            );
            if start.lost_focus() {
                actions.push(UiAction::CommitDate(DateField::Start));
            }
            if end.lost_focus() {
                actions.push(UiAction::CommitDate(DateField::End));
            }
            if ui.button("Reset").clicked() {
                actions.push(UiAction::List(ListIntent::reset_now()));
            }
            if ui.button("Refresh").clicked() {
                actions.push(UiAction::List(ListIntent::Refresh));
            }
        });
        if let Some(error) = &self.date_input_error {
            ui.colored_label(ui.visuals().error_fg_color, error.as_str());
        }
        if let Some(hint) = model.range_hint {
            ui.colored_label(ui.visuals().warn_fg_color, hint);
        }
        if let Some(banner) = &model.error_banner {
            ui.colored_label(ui.visuals().error_fg_color, banner.as_str());
        }
        ui.add_space(8.0);

        match model.body {
            ListBody::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.add(egui::Spinner::new().size(32.0));
                });
            }
            ListBody::Empty { message } => {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.label(egui::RichText::new(message).weak());
                });
            }
            ListBody::Table { rows, pagination } => {
                let table_height = (ui.available_height() - 48.0).max(120.0);
                egui::ScrollArea::vertical()
                    .auto_shrink([false, true])
                    .max_height(table_height)
                    .show(ui, |ui| prescription_table(ui, &rows, actions));
                ui.separator();
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(pagination.previous_enabled, egui::Button::new("Previous"))
                        .clicked()
                    {
                        actions.push(UiAction::List(ListIntent::PreviousPage));
                    }
                    ui.label(pagination.label.as_str());
                    if ui
                        .add_enabled(pagination.next_enabled, egui::Button::new("Next"))
                        .clicked()
                    {
                        actions.push(UiAction::List(ListIntent::NextPage));
                    }
                });
            }
        }
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

fn login_text_field(
    ui: &mut egui::Ui,
    id: &'static str,
    label: &str,
    hint: &str,
    value: &mut String,
    password: bool,
    should_focus: bool,
) -> egui::Response {
    ui.label(egui::RichText::new(label).strong());
    let edit = egui::TextEdit::singleline(value)
        .id_salt(id)
        .hint_text(hint)
        .password(password)
        .desired_width(f32::INFINITY);
    let response = ui.add_sized([ui.available_width(), 34.0], edit);
    if should_focus {
        response.request_focus();
    }
    response
}

fn prescription_table(ui: &mut egui::Ui, rows: &[RowView], actions: &mut Vec<UiAction>) {
    egui::Grid::new("prescription_table")
        .striped(true)
        .num_columns(6)
        .spacing([18.0, 6.0])
        .show(ui, |ui| {
            for header in ["#", "Patient Name", "Age", "Gender", "Prescription Date", ""] {
                ui.label(egui::RichText::new(header).strong());
            }
            ui.end_row();

            for row in rows {
                ui.label(row.sequence.to_string());
                ui.label(row.name.as_str());
                ui.label(row.age.to_string());
                ui.label(row.gender.as_str());
                ui.label(row.prescription_date.as_str());
                if ui.button("View Details").clicked() {
                    actions.push(UiAction::Navigate(row.details));
                }
                ui.end_row();
            }
        });
}

fn show_overview(ui: &mut egui::Ui, model: Option<&OverviewModel>, actions: &mut Vec<UiAction>) {
    ui.horizontal(|ui| {
        ui.heading(Route::Overview.title());
        if ui.button("Refresh").clicked() {
            actions.push(UiAction::RefreshOverview);
        }
    });
    ui.add_space(8.0);

    let Some(model) = model else {
        ui.spinner();
        return;
    };
    if model.rows.is_empty() {
        ui.label(egui::RichText::new("No prescriptions recorded yet.").weak());
        return;
    }

    ui.label(format!("{} prescriptions in total", model.total));
    ui.add_space(6.0);
    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("daily_counts")
            .striped(true)
            .num_columns(2)
            .spacing([32.0, 6.0])
            .show(ui, |ui| {
                ui.label(egui::RichText::new("Date").strong());
                ui.label(egui::RichText::new("Prescriptions").strong());
                ui.end_row();
                for row in &model.rows {
                    ui.label(row.date.as_str());
                    ui.label(row.count.to_string());
                    ui.end_row();
                }
            });
    });
}

fn show_prescription_detail(
    ui: &mut egui::Ui,
    prescription: &Prescription,
    confirm_delete: &mut bool,
    actions: &mut Vec<UiAction>,
) {
    let id = prescription.id;
    ui.heading(Route::PrescriptionDetail(id).title());
    ui.add_space(8.0);

    let next_visit = prescription
        .next_visit_date
        .as_deref()
        .map(|raw| display_date(prescription.next_visit_day(), raw))
        .unwrap_or_else(|| "-".to_string());
    let fields = [
        ("Patient Name", title_case(&prescription.name)),
        ("Age", prescription.age.to_string()),
        ("Gender", title_case(&prescription.gender)),
        (
            "Prescription Date",
            display_date(
                prescription.prescription_day(),
                &prescription.prescription_date,
            ),
        ),
        (
            "Diagnosis",
            prescription.diagnosis.clone().unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Medicines",
            prescription.medicines.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("Next Visit", next_visit),
    ];
    egui::Grid::new("prescription_detail")
        .num_columns(2)
        .spacing([24.0, 8.0])
        .show(ui, |ui| {
            for (label, value) in fields {
                ui.label(egui::RichText::new(label).strong());
                ui.label(value);
                ui.end_row();
            }
        });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        if ui.button("Back to list").clicked() {
            actions.push(UiAction::Navigate(Route::PrescriptionList));
        }
        if ui.button("Edit").clicked() {
            actions.push(UiAction::Navigate(Route::EditPrescription(id)));
        }
        if *confirm_delete {
            ui.label("Delete this prescription?");
            if ui.button("Yes, delete").clicked() {
                actions.push(UiAction::Delete(id));
            }
            if ui.button("Cancel").clicked() {
                *confirm_delete = false;
            }
        } else if ui.button("Delete").clicked() {
            *confirm_delete = true;
        }
    });
}

fn show_prescription_form(
    ui: &mut egui::Ui,
    form: &mut PrescriptionForm,
    editing: bool,
    error: Option<&str>,
    saving: bool,
    cancel_to: Route,
    actions: &mut Vec<UiAction>,
) {
    egui::Grid::new("prescription_form")
        .num_columns(2)
        .spacing([16.0, 8.0])
        .show(ui, |ui| {
            ui.label("Prescription Date");
            if editing {
                ui.label(form.prescription_date.as_str());
            } else {
                ui.add(
                    egui::TextEdit::singleline(&mut form.prescription_date)
                        .hint_text("YYYY-MM-DD")
                        .desired_width(120.0),
                );
            }
            ui.end_row();

            ui.label("Patient Name");
            ui.add(egui::TextEdit::singleline(&mut form.name).desired_width(280.0));
            ui.end_row();

            ui.label("Age");
            ui.add(egui::TextEdit::singleline(&mut form.age).desired_width(60.0));
            ui.end_row();

            ui.label("Gender");
            let selected = if form.gender.is_empty() {
                "Select".to_string()
            } else {
                title_case(&form.gender)
            };
            egui::ComboBox::from_id_salt("prescription_gender")
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for option in GENDER_OPTIONS {
                        ui.selectable_value(&mut form.gender, option.to_string(), title_case(option));
                    }
                });
            ui.end_row();

            ui.label("Diagnosis");
            ui.add(
                egui::TextEdit::multiline(&mut form.diagnosis)
                    .desired_rows(3)
                    .desired_width(360.0),
            );
            ui.end_row();

            ui.label("Medicines");
            ui.add(
                egui::TextEdit::multiline(&mut form.medicines)
                    .desired_rows(3)
                    .desired_width(360.0),
            );
            ui.end_row();

            ui.label("Next Visit Date");
            ui.add(
                egui::TextEdit::singleline(&mut form.next_visit_date)
                    .hint_text("YYYY-MM-DD (optional)")
                    .desired_width(160.0),
            );
            ui.end_row();
        });

    if let Some(error) = error {
        ui.add_space(6.0);
        ui.colored_label(ui.visuals().error_fg_color, error);
    }

    ui.add_space(10.0);
    ui.horizontal(|ui| {
        let label = match (saving, editing) {
            (true, _) => "Saving...",
            (false, true) => "Save changes",
            (false, false) => "Create prescription",
        };
        if ui.add_enabled(!saving, egui::Button::new(label)).clicked() {
            actions.push(UiAction::SubmitForm);
        }
        if ui.button("Cancel").clicked() {
            actions.push(UiAction::Navigate(cancel_to));
        }
    });
}

impl eframe::App for RxDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        match self.screen {
            Screen::Login => self.show_login_screen(ctx),
            _ => self.show_main_workspace(ctx),
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedDesktopSettings {
            last_username: self.username.trim().to_string(),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
