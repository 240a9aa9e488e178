pub mod altitude;
pub mod direcao_vento;
pub mod leitura;
pub mod precipitacao;
pub mod pressao;
pub mod temperatura;
pub mod umidade_relativa;
pub mod umidade_solo;
pub mod velocidade_vento;

pub use leitura::Entity as Leitura;
