use crate::domain::{MatchRecord, Phase};

/// Human-readable tournament name for a tournament id
pub fn tournament_name(tournament_id: &str) -> String {
    match tournament_id.trim().to_ascii_uppercase().as_str() {
        "WC2026" | "WORLD_CUP_2026" | "MUNDIAL_2026" => "Copa Mundial de la FIFA 2026".to_string(),
        "UCL" | "CHAMPIONS_LEAGUE" => "UEFA Champions League".to_string(),
        "LIBERTADORES" | "COPA_LIBERTADORES" => "Copa Libertadores".to_string(),
        "COPA_AMERICA" => "Copa América".to_string(),
        "" => "Torneo de fútbol".to_string(),
        _ => tournament_id.trim().to_string(),
    }
}

fn draw_instruction(record: &MatchRecord) -> &'static str {
    // Unknown stages are labelled "Fase de Grupos" yet keep the fallback's
    // no-draw rule; the wording must not call them a knockout.
    if let Phase::Unknown(_) = record.phase {
        return "En este partido NO se acepta un empate como predicción. \
                Tu predicción debe tener un ganador claro (por ejemplo 2-1, no 1-1).";
    }

    if record.phase.is_elimination() {
        "Este es un partido de eliminación directa: NO puede terminar en empate. \
         Tu predicción debe tener un ganador claro (por ejemplo 2-1, no 1-1)."
    } else {
        "Este es un partido de fase de grupos: el empate es un resultado válido si lo consideras probable."
    }
}

/// Prompt asking the model for a strict-JSON score prediction
pub fn build_prediction_prompt(record: &MatchRecord) -> String {
    let stadium_line = record
        .stadium
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("- Estadio: {}\n", s))
        .unwrap_or_default();

    format!(
        r#"Eres un analista experto en fútbol. Predice el resultado del siguiente partido.

## Partido
- Torneo: {tournament}
- Fase: {phase}
- Local: {home}
- Visitante: {away}
{stadium_line}
## Reglas
{draw_rule}

Responde ÚNICAMENTE con un objeto JSON válido, sin texto adicional, con este formato exacto:
{{
  "predictedScore": "X-Y",
  "confidence": "high" | "medium" | "low",
  "reasoning": "2-3 frases explicando los factores clave"
}}

"predictedScore" usa goles enteros: primero {home}, luego {away}."#,
        tournament = tournament_name(&record.tournament_id),
        phase = record.phase.display_name(),
        home = record.home_team.trim(),
        away = record.away_team.trim(),
        stadium_line = stadium_line,
        draw_rule = draw_instruction(record),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_tournament_names() {
        assert_eq!(tournament_name("wc2026"), "Copa Mundial de la FIFA 2026");
        assert_eq!(tournament_name("Liga Local"), "Liga Local");
        assert_eq!(tournament_name(""), "Torneo de fútbol");
    }

    #[test]
    fn test_group_prompt_allows_draws() {
        let record = MatchRecord::new(Uuid::new_v4(), "Brasil", "Argentina", Phase::Group, "WC2026");
        let prompt = build_prediction_prompt(&record);

        assert!(prompt.contains("Brasil"));
        assert!(prompt.contains("Argentina"));
        assert!(prompt.contains("Fase de Grupos"));
        assert!(prompt.contains("Copa Mundial de la FIFA 2026"));
        assert!(prompt.contains("el empate es un resultado válido"));
        assert!(!prompt.contains("Estadio"));
    }

    #[test]
    fn test_elimination_prompt_requires_winner() {
        let record = MatchRecord::new(Uuid::new_v4(), "Francia", "España", Phase::Final, "WC2026")
            .with_stadium("MetLife Stadium");
        let prompt = build_prediction_prompt(&record);

        assert!(prompt.contains("Gran Final"));
        assert!(prompt.contains("NO puede terminar en empate"));
        assert!(prompt.contains("- Estadio: MetLife Stadium"));
        assert!(prompt.contains("\"predictedScore\": \"X-Y\""));
    }

    #[test]
    fn test_unknown_phase_prompt_is_consistent() {
        let record = MatchRecord::new(
            Uuid::new_v4(),
            "Chile",
            "Perú",
            Phase::from("REPECHAJE"),
            "COPA_AMERICA",
        );
        let prompt = build_prediction_prompt(&record);

        assert!(prompt.contains("Fase: Fase de Grupos"));
        assert!(prompt.contains("NO se acepta un empate"));
        assert!(!prompt.contains("eliminación directa"));
        assert!(!prompt.contains("el empate es un resultado válido"));
    }
}
