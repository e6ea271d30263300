use super::domain::Category;

/// One catalog row: the master-data shape of a checklist item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterDataRow {
    pub category: Category,
    pub name: String,
    pub task: String,
}

impl MasterDataRow {
    pub fn new(category: Category, name: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
            task: task.into(),
        }
    }
}

const STANDARD_ITEMS: &[(Category, &str, &str)] = &[
    (Category::Critical, "Sala de Bombas", "Presión y alternancia"),
    (Category::Critical, "Sala de Calderas", "Temperatura y fugas"),
    (Category::Critical, "Generador", "Nivel petróleo y batería"),
    (Category::Critical, "PEAS (Presurización)", "Prueba de ventilador"),
    (Category::Critical, "Ascensores (2)", "Nivelación y limpieza rieles"),
    (Category::Access, "Portones (2)", "Sensores y velocidad"),
    (Category::Access, "Control Biométrico", "Lectores huella/tarjeta"),
    (Category::Hygiene, "Sala de Basura", "Desinfección y contenedores"),
    (Category::Hygiene, "Ductos (20 pisos)", "Cierre de escotillas"),
    (Category::Common, "Piscina", "Parámetros Cl/pH"),
    (Category::Common, "Quincho / Eventos", "Mobiliario e higiene"),
    (Category::Common, "Gym / Sauna", "Máquinas y tableros"),
    (Category::Infrastructure, "Pasillos (1-20)", "Luces de emergencia"),
    (Category::Infrastructure, "Subterráneo", "Filtraciones y limpieza"),
    (Category::Infrastructure, "Jardines", "Riego programado"),
];

/// Built-in inspection catalog used to seed new sessions and the template.
pub fn standard_catalog() -> Vec<MasterDataRow> {
    STANDARD_ITEMS
        .iter()
        .map(|(category, name, task)| MasterDataRow::new(*category, *name, *task))
        .collect()
}
