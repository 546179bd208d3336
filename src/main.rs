use std::{future::IntoFuture, process, sync::Arc};

use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vgwritings::{
    application::{
        blog::BlogService,
        chrome::ChromeService,
        error::AppError,
        render::ContentRenderer,
        repos::{AboutRepo, DatasetExportRepo, GeneralPostsRepo, LearningPostsRepo},
        site::{self, SiteState},
        travels::TravelService,
    },
    config::{self, ContentBackend, ContentSettings},
    domain::assets::AssetResolver,
    infra::{
        content::{DatasetStore, SanityClient},
        error::InfraError,
        http::{self, HttpState},
        telemetry,
        trips::TripsFileRepo,
    },
};

const SOURCE: &str = "vgwritings::main";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Export(args) => run_export(settings, args).await,
    }
}

/// One content adapter seen through every repository trait.
struct ContentRepositories {
    general: Arc<dyn GeneralPostsRepo>,
    learning: Arc<dyn LearningPostsRepo>,
    about: Arc<dyn AboutRepo>,
    export: Arc<dyn DatasetExportRepo>,
}

impl ContentRepositories {
    fn from_adapter<T>(adapter: Arc<T>) -> Self
    where
        T: GeneralPostsRepo + LearningPostsRepo + AboutRepo + DatasetExportRepo + 'static,
    {
        Self {
            general: adapter.clone(),
            learning: adapter.clone(),
            about: adapter.clone(),
            export: adapter,
        }
    }
}

async fn init_content(settings: &ContentSettings) -> Result<ContentRepositories, AppError> {
    match settings.backend {
        ContentBackend::Sanity => {
            let client = SanityClient::new(settings)?;
            info!(
                target = SOURCE,
                endpoint = %client.endpoint(),
                "Using the hosted content store"
            );
            Ok(ContentRepositories::from_adapter(Arc::new(client)))
        }
        ContentBackend::File => {
            let store = DatasetStore::load(&settings.dataset_path).await?;
            Ok(ContentRepositories::from_adapter(Arc::new(store)))
        }
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let content = init_content(&settings.content).await?;

    site::install(SiteState {
        title: settings.site.title.clone(),
        description: settings.site.description.clone(),
        public_url: settings.site.public_url.to_string(),
        navigation: site::default_navigation(),
        social: settings.site.social.clone(),
        career: settings.site.career.clone(),
        default_theme: settings.site.default_theme,
    })?;

    let renderer = ContentRenderer::new(AssetResolver::new(
        settings.content.project_id.clone(),
        settings.content.dataset.clone(),
    ));
    let blog = BlogService::new(
        content.general,
        content.learning,
        content.about,
        renderer,
        settings.site.public_url.as_str(),
    );
    let travels = TravelService::new(Arc::new(TripsFileRepo::new(
        settings.travels.data_path.clone(),
    )));
    let state = HttpState::new(blog, travels, ChromeService::new(site::current()));

    serve_http(&settings, state).await
}

async fn run_export(settings: config::Settings, args: config::ExportArgs) -> Result<(), AppError> {
    let content = init_content(&settings.content).await?;
    let count = site::export_dataset(content.export.as_ref(), &args.file).await?;
    info!(
        target = SOURCE,
        documents = count,
        path = %args.file.display(),
        "Exported content dataset"
    );
    Ok(())
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = SOURCE, addr = %settings.server.addr, "Listening");

    let drain = Arc::new(Notify::new());
    let signal = drain.clone();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move { signal.notified().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::unexpected(format!("server error: {err}")));
        }
        () = shutdown_signal() => {}
    }

    info!(target = SOURCE, "Shutdown requested, draining connections");
    drain.notify_one();
    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(result) => result.map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        Err(_) => {
            warn!(
                target = SOURCE,
                grace_seconds = settings.server.graceful_shutdown.as_secs(),
                "Graceful shutdown timed out"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target = SOURCE, error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
