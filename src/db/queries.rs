pub const SELECT_RECENT_DUPLICATE: &str = r#"
SELECT id, shipment_id, alert_type, severity, title, message, metadata,
       triggered_at, is_active, resolved_at, resolved_by
FROM alerts
WHERE shipment_id = $1
  AND alert_type = $2
  AND is_active = TRUE
  AND triggered_at > $3
ORDER BY triggered_at DESC
LIMIT 1;
"#;

pub const LOCK_ALERT_PAIR: &str = r#"
SELECT pg_advisory_xact_lock(hashtextextended($1 || '|' || $2, 0));
"#;

pub const INSERT_ALERT: &str = r#"
INSERT INTO alerts (
    id, shipment_id, alert_type, severity, title, message, metadata, triggered_at, is_active
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE);
"#;

pub const SELECT_ACTIVE_ALERTS: &str = r#"
SELECT a.id, a.shipment_id, a.alert_type, a.severity, a.title, a.message, a.metadata,
       a.triggered_at, a.is_active, a.resolved_at, a.resolved_by,
       s.origin, s.destination, s.current_location, s.status AS shipment_status
FROM alerts a
LEFT JOIN shipments s ON a.shipment_id = s.shipment_id
WHERE a.is_active = TRUE
ORDER BY a.triggered_at DESC
LIMIT $1;
"#;

pub const RESOLVE_ALERT: &str = r#"
UPDATE alerts
SET is_active = FALSE,
    resolved_at = NOW(),
    resolved_by = $2
WHERE id = $1
  AND is_active = TRUE;
"#;

pub const SUMMARY_BY_SEVERITY: &str = r#"
SELECT severity,
       COUNT(*) AS count,
       COUNT(*) FILTER (WHERE is_active) AS active_count
FROM alerts
WHERE triggered_at > $1
GROUP BY severity
ORDER BY CASE severity
    WHEN 'Critical' THEN 4
    WHEN 'High' THEN 3
    WHEN 'Medium' THEN 2
    WHEN 'Low' THEN 1
    ELSE 0
END DESC;
"#;

pub const SUMMARY_TOTALS: &str = r#"
SELECT COUNT(*) AS total_alerts,
       COUNT(*) FILTER (WHERE is_active) AS active_alerts,
       COUNT(*) FILTER (WHERE resolved_at IS NOT NULL) AS resolved_alerts
FROM alerts
WHERE triggered_at > $1;
"#;
