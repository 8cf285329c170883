use prima_state::channels::domain::Channels;
use prima_state::context::domain::AppContext;
use prima_state::page::domain::Page;
use prima_state::sweep::domain::start_sweep_timer;
use prima_state::sweep::logic::start_sweeper;
use prima_state::system::domain::{init_tracing, System};
use tracing::{error, info};


#[tokio::main]
async fn main() {

    let system = match System::new() {
        Ok(system) => system,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&system);
    info!("Info: configuración cargada para el entorno {}", system.environment);

    let channels = Channels::new();
    let app_context = AppContext::new(system);

    let containers: Vec<_> = Page::ALL.iter()
        .map(|page| app_context.new_container(*page))
        .collect();
    info!("Info: {} contenedores de página listos", containers.len());

    start_sweep_timer(channels.timer_to_sweeper,
                      channels.timer_from_sweeper);

    start_sweeper(channels.sweeper_to_timer,
                  channels.sweeper_from_timer,
                  app_context.clone());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Error: no se pudo escuchar la señal de apagado. {e}");
    }

    for (page, container) in Page::ALL.iter().zip(&containers) {
        info!("Info: {} métricas de caché {:?}", page.name(), container.cache().metrics());
    }
    info!("Info: servicio finalizado");
}
